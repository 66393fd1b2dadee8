pub mod replay;
pub mod session;
mod settings;

pub use self::settings::*;

use anyhow::*;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::store::FileStore;

mod commands;
mod config;
mod delivery;
mod import;
mod output;
mod quiz;
mod store;

/// Import spreadsheet quizzes into folders and take them against the clock.
#[derive(Debug, Parser)]
#[command(name = "quizdesk", version)]
struct Cli {
    /// Where quizzes, results and drafts are kept
    #[arg(long, global = true, env = config::DATA_DIR_VARIABLE)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let data_dir = config::data_dir(cli.data_dir.as_deref())?;
    let store = FileStore::new(data_dir);
    commands::run(cli.command, &store)
}

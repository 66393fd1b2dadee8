use anyhow::*;
use clap::ValueEnum;
use directories_next::BaseDirs;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::delivery::{
    Settings, DEFAULT_TIME_PER_QUESTION_SECS, STORED_TIME_PER_QUESTION_FLOOR_SECS,
    TIME_PER_QUESTION_RANGE_SECS,
};
use crate::store::{keys, KeyValueStore};

pub const APP_DIRECTORY: &str = "quizdesk";
pub const DATA_DIR_VARIABLE: &str = "QUIZDESK_DATA_DIR";

pub fn data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    let mut dir = BaseDirs::new()
        .context("could not locate system directories")?
        .data_dir()
        .to_path_buf();
    dir.push(APP_DIRECTORY);
    Ok(dir)
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum Role {
    #[default]
    Guest,
    Admin,
    Learner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Guest => "guest",
            Role::Admin => "admin",
            Role::Learner => "learner",
        };
        f.write_str(name)
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "guest" => Ok(Role::Guest),
            "admin" => Ok(Role::Admin),
            "learner" => Ok(Role::Learner),
            other => Err(anyhow!("Unknown role {:?}", other)),
        }
    }
}

/// The stored role. Anything missing or unrecognized counts as a guest.
pub fn load_role<S: KeyValueStore + ?Sized>(store: &S) -> Result<Role> {
    let role: Role = match store.get(keys::ROLE)? {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Ignoring stored role: {}", e);
            Role::Guest
        }),
        None => Role::Guest,
    };
    Ok(role)
}

pub fn save_role<S: KeyValueStore + ?Sized>(store: &S, role: Role) -> Result<()> {
    match role {
        Role::Guest => store.remove(keys::ROLE)?,
        _ => store.set(keys::ROLE, &role.to_string())?,
    }
    info!("Role is now {}", role);
    Ok(())
}

pub fn load_time_per_question<S: KeyValueStore + ?Sized>(store: &S) -> Result<Duration> {
    let stored = store
        .get(keys::TIME_PER_QUESTION)?
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|secs| *secs > STORED_TIME_PER_QUESTION_FLOOR_SECS);
    Ok(Duration::from_secs(
        stored.unwrap_or(DEFAULT_TIME_PER_QUESTION_SECS),
    ))
}

pub fn save_time_per_question<S: KeyValueStore + ?Sized>(store: &S, secs: u64) -> Result<()> {
    if !TIME_PER_QUESTION_RANGE_SECS.contains(&secs) {
        return Err(anyhow!(
            "Time per question must be between {} and {} seconds",
            TIME_PER_QUESTION_RANGE_SECS.start(),
            TIME_PER_QUESTION_RANGE_SECS.end()
        ));
    }
    store.set(keys::TIME_PER_QUESTION, &secs.to_string())?;
    info!("Time per question is now {}s", secs);
    Ok(())
}

pub fn load_settings<S: KeyValueStore + ?Sized>(store: &S) -> Result<Settings> {
    Ok(Settings::with_time_per_question(load_time_per_question(
        store,
    )?))
}

use anyhow::*;
use clap::Subcommand;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::config::{self, Role};
use crate::delivery::replay::ReplayKind;
use crate::store::{drafts, FileStore, KeyValueStore};

pub mod admin;
pub mod learner;

#[cfg(test)]
mod tests;

const ERROR_NOT_ADMIN: &str = "This command is for admins. Use `quizdesk role admin` first.";
const ERROR_NOT_LEARNER: &str = "This command is for learners. Use `quizdesk role learner` first.";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Switch to another role
    Role { role: Role },
    /// Show the current role and where data is kept
    Whoami,
    /// Manage the folder tree (admin)
    #[command(subcommand)]
    Folder(admin::FolderCommand),
    /// Manage quizzes (admin)
    #[command(subcommand)]
    Quiz(admin::QuizCommand),
    /// Import a CSV or spreadsheet into a folder (admin)
    Import {
        file: PathBuf,
        #[arg(long)]
        folder: String,
        #[arg(long)]
        title: Option<String>,
        /// Save without asking for confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Write a sample CSV showing the expected columns (admin)
    Template { path: Option<PathBuf> },
    /// Show past results (admin)
    Results {
        #[command(subcommand)]
        action: Option<ResultsCommand>,
        #[arg(long)]
        quiz: Option<String>,
    },
    /// Take a quiz (learner)
    Play { quiz_id: String },
    /// Continue the unfinished quiz (learner)
    Resume,
    /// Manage the unfinished quiz (learner)
    #[command(subcommand)]
    Draft(DraftCommand),
    /// Replay part of the last finished quiz (learner)
    Replay { kind: ReplayKind },
    /// Learner preferences
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Debug, Subcommand)]
pub enum ResultsCommand {
    /// Delete every stored result
    Clear {
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum DraftCommand {
    /// Forget the unfinished quiz
    Discard,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Seconds allowed per question, between 5 and 300
    TimePerQuestion { secs: u64 },
}

fn require_role<S: KeyValueStore + ?Sized>(
    store: &S,
    role: Role,
    error: &'static str,
) -> Result<()> {
    if config::load_role(store)? != role {
        return Err(anyhow!(error));
    }
    Ok(())
}

pub fn require_admin<S: KeyValueStore + ?Sized>(store: &S) -> Result<()> {
    require_role(store, Role::Admin, ERROR_NOT_ADMIN)
}

pub fn require_learner<S: KeyValueStore + ?Sized>(store: &S) -> Result<()> {
    require_role(store, Role::Learner, ERROR_NOT_LEARNER)
}

pub fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Could not read from stdin")?;
    Ok(line.trim().to_owned())
}

pub fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("{} [y/N] ", question))?;
    Ok(is_yes(&answer))
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn whoami(store: &FileStore) -> Result<()> {
    let role = config::load_role(store)?;
    println!("Role: {}", role);
    if role == Role::Learner {
        println!("Session: {}", drafts::session_id(store)?);
    }
    println!("Data directory: {}", store.root().display());
    Ok(())
}

pub fn run(command: Command, store: &FileStore) -> Result<()> {
    match command {
        Command::Role { role } => {
            config::save_role(store, role)?;
            println!("You are now {}.", role);
            Ok(())
        }
        Command::Whoami => whoami(store),
        Command::Folder(command) => {
            require_admin(store)?;
            admin::folder(store, command)
        }
        Command::Quiz(command) => {
            require_admin(store)?;
            admin::quiz(store, command)
        }
        Command::Import {
            file,
            folder,
            title,
            yes,
        } => {
            require_admin(store)?;
            admin::import(store, &file, &folder, title.as_deref(), yes)
        }
        Command::Template { path } => {
            require_admin(store)?;
            admin::template(path.as_deref())
        }
        Command::Results { action, quiz } => {
            require_admin(store)?;
            match action {
                Some(ResultsCommand::Clear { yes }) => admin::clear_results(store, yes),
                None => admin::results(store, quiz.as_deref()),
            }
        }
        Command::Play { quiz_id } => {
            require_learner(store)?;
            learner::play(store, &quiz_id)
        }
        Command::Resume => {
            require_learner(store)?;
            learner::resume(store)
        }
        Command::Draft(DraftCommand::Discard) => {
            require_learner(store)?;
            learner::discard_draft(store)
        }
        Command::Replay { kind } => {
            require_learner(store)?;
            learner::replay(store, kind)
        }
        Command::Settings(SettingsCommand::TimePerQuestion { secs }) => {
            require_learner(store)?;
            config::save_time_per_question(store, secs)?;
            println!("Each question now allows {} seconds.", secs);
            Ok(())
        }
    }
}

use anyhow::*;
use clap::Subcommand;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::commands::{confirm, prompt};
use crate::import::{self, template, ImportReport};
use crate::output::terminal::format_clock;
use crate::quiz::{ManualQuiz, QuestionDraft, Quiz};
use crate::store::folders::{find_folder, Folder, QuizStore};
use crate::store::results::ResultLog;
use crate::store::KeyValueStore;

const PREVIEW_QUESTIONS: usize = 3;

#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// Create a folder, optionally inside another one
    Create {
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Show the folder tree
    List,
    /// Delete a folder with its subfolders and quizzes
    Delete {
        id: String,
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum QuizCommand {
    /// List quizzes, everywhere or in one folder
    List {
        #[arg(long)]
        folder: Option<String>,
    },
    /// Delete a quiz from a folder
    Delete {
        folder: String,
        quiz: String,
        #[arg(long, short)]
        yes: bool,
    },
    /// Write a quiz question by question
    New {
        #[arg(long)]
        folder: String,
        #[arg(long)]
        title: Option<String>,
    },
}

fn print_folders(folders: &[Folder], depth: usize) {
    for folder in folders {
        println!(
            "{}📁 {} [{}] ({} quiz(zes))",
            "  ".repeat(depth),
            folder.name,
            folder.id,
            folder.quizzes.len()
        );
        print_folders(&folder.subfolders, depth + 1);
    }
}

pub fn folder<S: KeyValueStore + ?Sized>(store: &S, command: FolderCommand) -> Result<()> {
    let quizzes = QuizStore::new(store);
    match command {
        FolderCommand::Create { name, parent } => {
            let folder = quizzes.create_folder(&name, parent.as_deref())?;
            println!("Created folder {} [{}]", folder.name, folder.id);
        }
        FolderCommand::List => {
            let folders = quizzes.folders()?;
            if folders.is_empty() {
                println!("No folders yet. Create one with `quizdesk folder create <name>`.");
            }
            print_folders(&folders, 0);
        }
        FolderCommand::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete folder {} and everything inside it?", id))? {
                return Ok(());
            }
            let folder = quizzes.delete_folder(&id)?;
            println!("Deleted folder {}", folder.name);
        }
    }
    Ok(())
}

pub fn quiz<S: KeyValueStore + ?Sized>(store: &S, command: QuizCommand) -> Result<()> {
    let quizzes = QuizStore::new(store);
    match command {
        QuizCommand::List { folder: Some(folder_id) } => {
            for quiz in quizzes.list_by_folder(&folder_id)? {
                println!("{} [{}] {} question(s)", quiz.title, quiz.id, quiz.questions.len());
            }
        }
        QuizCommand::List { folder: None } => {
            for entry in quizzes.all_quizzes()? {
                println!(
                    "{} [{}] {} question(s) in {}",
                    entry.quiz.title,
                    entry.quiz.id,
                    entry.quiz.questions.len(),
                    entry.folder_name()
                );
            }
        }
        QuizCommand::Delete { folder, quiz, yes } => {
            if !yes && !confirm(&format!("Delete quiz {}?", quiz))? {
                return Ok(());
            }
            let deleted = quizzes.delete(&folder, &quiz)?;
            println!("Deleted quiz {}", deleted.title);
        }
        QuizCommand::New { folder, title } => {
            let title = match title {
                Some(title) => title,
                None => prompt("Quiz title: ")?,
            };
            let quiz = author_quiz(&title)?;
            let count = quiz.questions.len();
            quizzes.save(&folder, quiz)?;
            println!("Saved {:?} with {} question(s)", title.trim(), count);
        }
    }
    Ok(())
}

fn author_quiz(title: &str) -> Result<Quiz> {
    let mut manual = ManualQuiz::new(title);
    loop {
        let question = prompt(&format!(
            "Question {} (leave blank to finish): ",
            manual.len() + 1
        ))?;
        if question.is_empty() {
            break;
        }
        let draft = QuestionDraft {
            question,
            options: prompt("Options, comma separated: ")?,
            correct_answer: prompt("Correct answer: ")?,
            explanation: prompt("Explanation (optional): ")?,
            media: prompt("Media URLs (optional): ")?,
        };
        if let Err(e) = manual.add_question(draft) {
            println!("{}", e);
        }
    }
    Ok(manual.build()?)
}

fn print_preview(report: &ImportReport) {
    let questions = &report.pending.questions;
    println!(
        "Parsed {} question(s) from {}",
        questions.len(),
        report.pending.file_name
    );
    for question in questions.iter().take(PREVIEW_QUESTIONS) {
        println!(
            "  • {} [{}] → {}",
            question.question,
            question.options.join(" | "),
            question.correct_answer
        );
    }
    if questions.len() > PREVIEW_QUESTIONS {
        println!("  … and {} more", questions.len() - PREVIEW_QUESTIONS);
    }
}

pub fn import<S: KeyValueStore + ?Sized>(
    store: &S,
    file: &Path,
    folder_id: &str,
    title: Option<&str>,
    yes: bool,
) -> Result<()> {
    let quizzes = QuizStore::new(store);
    let folders = quizzes.folders()?;
    if folders.is_empty() {
        return Err(anyhow!("Create a folder before importing quizzes."));
    }
    if find_folder(&folders, folder_id).is_none() {
        return Err(anyhow!("Folder {} not found", folder_id));
    }

    let report = import::import_file(file).map_err(|e| {
        if let Some(diagnostics) = serde_json::to_string_pretty(e.diagnostics()).ok() {
            eprintln!("{}", diagnostics);
        }
        e
    })?;
    println!("{}", serde_json::to_string_pretty(&report.diagnostics)?);
    print_preview(&report);

    let title = title
        .map(str::to_owned)
        .unwrap_or_else(|| report.pending.suggested_title());
    if !yes && !confirm(&format!("Save {:?} into folder {}?", title, folder_id))? {
        report.pending.discard();
        println!("Import discarded.");
        return Ok(());
    }
    let quiz = report
        .pending
        .confirm(&quizzes, folder_id, Some(&title))
        .with_context(|| format!("Could not save import from {:?}", file))?;
    println!("Saved {:?} [{}]", quiz.title, quiz.id);
    Ok(())
}

pub fn template(path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or_else(|| Path::new(template::TEMPLATE_FILE_NAME));
    template::save_template(path)
        .with_context(|| format!("Could not write template to {:?}", path))?;
    println!("Wrote template to {}", path.display());
    Ok(())
}

pub fn results<S: KeyValueStore + ?Sized>(store: &S, quiz_title: Option<&str>) -> Result<()> {
    let log = ResultLog::new(store);
    let records = log.list(quiz_title)?;
    if records.is_empty() {
        println!("No results yet.");
        let titles = log.quiz_titles()?;
        if quiz_title.is_some() && !titles.is_empty() {
            println!("Quizzes with results: {}", titles.join(", "));
        }
        return Ok(());
    }
    for record in records {
        println!(
            "{}  {}  {}/{} ({}%)  ✅ {} ❌ {} ⏭️ {}  🕒 {}",
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.quiz_title,
            record.score,
            record.total_questions,
            record.percentage(),
            record.score,
            record.wrong_count,
            record.skipped_count,
            format_clock(Duration::from_secs(record.time_used_secs))
        );
    }
    Ok(())
}

pub fn clear_results<S: KeyValueStore + ?Sized>(store: &S, yes: bool) -> Result<()> {
    if !yes && !confirm("Delete every stored result?")? {
        return Ok(());
    }
    ResultLog::new(store).clear()?;
    info!("Result history cleared from the command line");
    println!("Results cleared.");
    Ok(())
}

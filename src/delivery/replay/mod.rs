use clap::ValueEnum;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

use crate::quiz::{Question, Quiz};
use crate::store::folders::FolderQuiz;
use crate::store::results::ResultRecord;


const SYNTHETIC_QUIZ_TITLE: &str = "Quiz Replay";

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ReplayKind {
    All,
    Wrong,
    Favorite,
    Answered,
    Skipped,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("Cannot find question data to replay the quiz.")]
    NoQuestionData,
}

/// The quiz a result was recorded against: by id, then by title, else rebuilt from the
/// questions stored in the result itself.
fn source_quiz(result: &ResultRecord, available: &[FolderQuiz]) -> Result<Quiz, ReplayError> {
    let by_id = result
        .quiz_id
        .as_deref()
        .and_then(|id| available.iter().find(|entry| entry.quiz.id == id));
    let by_title = || {
        available
            .iter()
            .find(|entry| !result.quiz_title.is_empty() && entry.quiz.title == result.quiz_title)
    };
    if let Some(entry) = by_id.or_else(by_title) {
        return Ok(entry.quiz.clone());
    }

    let questions: Vec<Question> = result.questions.iter().map(|q| q.to_question()).collect();
    if questions.is_empty() {
        return Err(ReplayError::NoQuestionData);
    }
    debug!("Rebuilding {:?} from its result", result.quiz_title);
    let title = if result.quiz_title.is_empty() {
        SYNTHETIC_QUIZ_TITLE
    } else {
        result.quiz_title.as_str()
    };
    let mut quiz = Quiz::new(title, questions);
    if let Some(id) = &result.quiz_id {
        quiz.id = id.clone();
    }
    Ok(quiz)
}

fn select_questions(result: &ResultRecord, quiz: &Quiz, kind: ReplayKind) -> Vec<Question> {
    let keep_if = |texts: HashSet<&str>| -> Vec<Question> {
        quiz.questions
            .iter()
            .filter(|q| texts.contains(q.question.as_str()))
            .cloned()
            .collect()
    };
    match kind {
        ReplayKind::All => quiz.questions.clone(),
        ReplayKind::Wrong => result
            .wrong_questions
            .iter()
            .map(|q| q.to_question())
            .collect(),
        ReplayKind::Favorite => {
            keep_if(result.favorite_questions.iter().map(String::as_str).collect())
        }
        ReplayKind::Answered => keep_if(
            result
                .questions
                .iter()
                .filter(|q| q.is_correct())
                .map(|q| q.question.as_str())
                .collect(),
        ),
        ReplayKind::Skipped => {
            let answered: HashSet<&str> = result
                .questions
                .iter()
                .filter(|q| q.is_answered())
                .map(|q| q.question.as_str())
                .collect();
            quiz.questions
                .iter()
                .filter(|q| !answered.contains(q.question.as_str()))
                .cloned()
                .collect()
        }
    }
}

/// Builds a quiz to play again from a past result. A kind that selects nothing replays
/// every question.
pub fn build_replay(
    result: &ResultRecord,
    available: &[FolderQuiz],
    kind: ReplayKind,
) -> Result<Quiz, ReplayError> {
    let quiz = source_quiz(result, available)?;
    let mut questions = select_questions(result, &quiz, kind);
    if questions.is_empty() {
        debug!("No questions matched replay kind {:?}", kind);
        questions = quiz.questions.clone();
    }
    if questions.is_empty() {
        return Err(ReplayError::NoQuestionData);
    }
    info!(
        "Replaying {} question(s) of {:?} ({:?})",
        questions.len(),
        quiz.title,
        kind
    );
    Ok(Quiz { questions, ..quiz })
}

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use thiserror::Error;

#[cfg(test)]
mod tests;

lazy_static! {
    static ref MANUAL_MEDIA_SEPARATOR_REGEX: Regex = Regex::new("[;,]").unwrap();
}

pub const DEFAULT_QUIZ_TITLE: &str = "Imported Quiz";

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub media: Vec<String>,
}

impl Question {
    pub fn is_answer_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }

    pub fn option_index(&self, answer: &str) -> Option<usize> {
        self.options.iter().position(|o| o == answer)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn new(title: &str, questions: Vec<Question>) -> Self {
        let now = Utc::now();
        let suffix: u16 = rand::thread_rng().gen();
        Quiz {
            id: format!("quiz-{}-{:04x}", now.timestamp_millis(), suffix),
            title: title.trim().to_owned(),
            questions,
            created_at: now,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthoringError {
    #[error("Question text, options, and correct answer are required.")]
    MissingFields,
    #[error("Correct answer must be one of the provided options.")]
    CorrectAnswerNotAnOption,
    #[error("Please enter a quiz title.")]
    MissingTitle,
    #[error("Add at least one question to the quiz before saving.")]
    NoQuestions,
}

/// Free-form input for a hand-written question, as typed by an admin.
#[derive(Clone, Debug, Default)]
pub struct QuestionDraft {
    pub question: String,
    pub options: String,
    pub correct_answer: String,
    pub explanation: String,
    pub media: String,
}

impl TryFrom<QuestionDraft> for Question {
    type Error = AuthoringError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        let question = draft.question.trim();
        let correct_answer = draft.correct_answer.trim();
        if question.is_empty() || draft.options.trim().is_empty() || correct_answer.is_empty() {
            return Err(AuthoringError::MissingFields);
        }

        let options: Vec<String> = draft
            .options
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_owned)
            .collect();
        if !options.iter().any(|o| o == correct_answer) {
            return Err(AuthoringError::CorrectAnswerNotAnOption);
        }

        let media = MANUAL_MEDIA_SEPARATOR_REGEX
            .split(&draft.media)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(Question {
            question: question.to_owned(),
            options,
            correct_answer: correct_answer.to_owned(),
            explanation: draft.explanation.trim().to_owned(),
            media,
        })
    }
}

/// Accumulates hand-written questions until the quiz is saved.
#[derive(Debug, Default)]
pub struct ManualQuiz {
    title: String,
    questions: Vec<Question>,
}

impl ManualQuiz {
    pub fn new(title: &str) -> Self {
        ManualQuiz {
            title: title.to_owned(),
            questions: Vec::new(),
        }
    }

    pub fn add_question(&mut self, draft: QuestionDraft) -> Result<&Question, AuthoringError> {
        let question = Question::try_from(draft)?;
        self.questions.push(question);
        Ok(&self.questions[self.questions.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn build(self) -> Result<Quiz, AuthoringError> {
        if self.title.trim().is_empty() {
            return Err(AuthoringError::MissingTitle);
        }
        if self.questions.is_empty() {
            return Err(AuthoringError::NoQuestions);
        }
        Ok(Quiz::new(&self.title, self.questions))
    }
}

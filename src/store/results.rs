use anyhow::Result;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::info;

use super::{keys, load, save, KeyValueStore};
use crate::quiz::Question;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub user_answer: Option<String>,
    #[serde(default)]
    pub explanation: String,
}

impl AnsweredQuestion {
    pub fn new(question: &Question, user_answer: Option<&str>) -> Self {
        AnsweredQuestion {
            question: question.question.clone(),
            options: question.options.clone(),
            correct_answer: question.correct_answer.clone(),
            user_answer: user_answer.map(str::to_owned),
            explanation: question.explanation.clone(),
        }
    }

    pub fn is_answered(&self) -> bool {
        self.user_answer.is_some()
    }

    pub fn is_correct(&self) -> bool {
        self.user_answer.as_deref() == Some(self.correct_answer.as_str())
    }

    pub fn to_question(&self) -> Question {
        Question {
            question: self.question.clone(),
            options: self.options.clone(),
            correct_answer: self.correct_answer.clone(),
            explanation: self.explanation.clone(),
            media: Vec::new(),
        }
    }
}

/// Summary of one finished quiz attempt.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub session_id: String,
    pub quiz_id: Option<String>,
    pub quiz_title: String,
    pub score: usize,
    pub total_questions: usize,
    pub skipped_count: usize,
    pub wrong_count: usize,
    pub favorite_count: usize,
    pub answers: Vec<Option<String>>,
    pub correct_answers: Vec<String>,
    pub notes: Vec<String>,
    pub total_secs: u64,
    pub total_left_secs: u64,
    pub time_used_secs: u64,
    pub questions: Vec<AnsweredQuestion>,
    pub wrong_questions: Vec<AnsweredQuestion>,
    #[serde(default)]
    pub favorite_questions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl ResultRecord {
    pub fn percentage(&self) -> usize {
        if self.total_questions == 0 {
            0
        } else {
            (self.score * 100 + self.total_questions / 2) / self.total_questions
        }
    }
}

pub struct ResultLog<S> {
    store: S,
}

impl<S: KeyValueStore> ResultLog<S> {
    pub fn new(store: S) -> Self {
        ResultLog { store }
    }

    fn records(&self) -> Result<Vec<ResultRecord>> {
        Ok(load(&self.store, keys::RESULTS)?)
    }

    pub fn append(&self, record: ResultRecord) -> Result<()> {
        let mut records = self.records()?;
        info!(
            "Recording result {}/{} for {:?}",
            record.score, record.total_questions, record.quiz_title
        );
        records.push(record);
        Ok(save(&self.store, keys::RESULTS, &records)?)
    }

    /// Results newest first, optionally only those of one quiz title.
    pub fn list(&self, quiz_title: Option<&str>) -> Result<Vec<ResultRecord>> {
        let mut records: Vec<ResultRecord> = self
            .records()?
            .into_iter()
            .filter(|r| quiz_title.map_or(true, |title| r.quiz_title == title))
            .collect();
        records.sort_by_key(|r| Reverse(r.timestamp));
        Ok(records)
    }

    pub fn quiz_titles(&self) -> Result<Vec<String>> {
        Ok(self
            .records()?
            .into_iter()
            .map(|r| r.quiz_title)
            .filter(|title| !title.is_empty())
            .unique()
            .collect())
    }

    pub fn latest_for_session(&self, session_id: &str) -> Result<Option<ResultRecord>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| r.session_id == session_id)
            .max_by_key(|r| r.timestamp))
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(keys::RESULTS)?;
        info!("Cleared result history");
        Ok(())
    }
}

use std::time::Duration;

use crate::quiz::Question;

#[cfg(test)]
pub mod mock;
pub mod terminal;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Message {
    AnswerSelected(String),
    AutoNextToggled(bool),
    FavoriteToggled(bool),
    NoteSaved,
    QuestionBegins(usize, usize, Question),
    QuizBegins(String, usize, Duration),
    QuizResults(QuizSummary),
    ReadyToSubmit,
    SessionPaused,
    SessionResumed,
    TimeRemaining(Duration),
    TimersChanged(Duration, Duration),
    TimeUp(usize),
    TotalTimeUp,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuizSummary {
    pub title: String,
    pub score: usize,
    pub total_questions: usize,
    pub skipped_count: usize,
    pub wrong_count: usize,
    pub percentage: usize,
    pub time_used: Duration,
}

pub trait SessionOutput {
    fn say(&self, message: &Message);
}

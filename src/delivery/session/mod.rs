use anyhow::*;
use chrono::Utc;
use std::cmp::min;
use std::time::Duration;
use tracing::{debug, info};

use crate::delivery::{
    clamp_secs, Settings, TIME_PER_QUESTION_RANGE_SECS, TOTAL_TIME_RANGE_SECS,
};
use crate::output::{Message, QuizSummary, SessionOutput};
use crate::quiz::{Question, Quiz};
use crate::store::drafts::Draft;
use crate::store::results::{AnsweredQuestion, ResultRecord};


/// Whole seconds, rounded up so a partially elapsed second still counts as remaining.
fn whole_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

fn restore_vec<T: Clone>(saved: &[T], len: usize, fallback: T) -> Vec<T> {
    if saved.len() == len {
        saved.to_vec()
    } else {
        vec![fallback; len]
    }
}

pub struct Session<O: SessionOutput> {
    quiz: Quiz,
    settings: Settings,
    current_index: usize,
    answers: Vec<Option<String>>,
    favorites: Vec<bool>,
    notes: Vec<String>,
    time_per_question: Duration,
    total_time: Duration,
    total_left: Duration,
    time_left: Duration,
    paused: bool,
    auto_next: bool,
    ready_to_submit: bool,
    output: O,
}

impl<O: SessionOutput> Session<O> {
    pub fn new(quiz: Quiz, settings: Settings, output: O) -> Self {
        let count = quiz.questions.len();
        let total_time = settings.total_time(count);
        Session {
            current_index: 0,
            answers: vec![None; count],
            favorites: vec![false; count],
            notes: vec![String::new(); count],
            time_per_question: settings.time_per_question,
            total_time,
            total_left: total_time,
            time_left: settings.time_per_question,
            paused: false,
            auto_next: settings.auto_next,
            ready_to_submit: false,
            quiz,
            settings,
            output,
        }
    }

    /// Resumes from a draft of the same quiz. Per-question data whose length no longer
    /// matches the quiz is reset; missing clocks fall back to the settings.
    pub fn restore(quiz: Quiz, draft: &Draft, settings: Settings, output: O) -> Result<Self> {
        if draft.quiz_id != quiz.id {
            return Err(anyhow!(
                "Draft belongs to quiz {} and cannot resume {}",
                draft.quiz_id,
                quiz.id
            ));
        }
        let count = quiz.questions.len();
        let time_per_question = draft
            .per_question_secs
            .map(Duration::from_secs)
            .unwrap_or(settings.time_per_question);
        let total_time = draft.total_secs.map(Duration::from_secs).unwrap_or_else(|| {
            Settings::with_time_per_question(time_per_question).total_time(count)
        });
        let session = Session {
            current_index: min(draft.current_index, count.saturating_sub(1)),
            answers: restore_vec(&draft.answers, count, None),
            favorites: restore_vec(&draft.favorites, count, false),
            notes: restore_vec(&draft.notes, count, String::new()),
            time_per_question,
            total_time,
            total_left: draft
                .total_left_secs
                .map(Duration::from_secs)
                .unwrap_or(total_time),
            time_left: draft
                .time_left_secs
                .map(Duration::from_secs)
                .unwrap_or(time_per_question),
            paused: draft.paused,
            auto_next: draft.auto_next,
            ready_to_submit: false,
            quiz,
            settings,
            output,
        };
        info!(
            "Restored draft of {:?} at question {}",
            session.quiz.title,
            session.current_index + 1
        );
        Ok(session)
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.questions.get(self.current_index)
    }

    pub fn current_answer(&self) -> Option<&str> {
        self.answers
            .get(self.current_index)
            .and_then(|answer| answer.as_deref())
    }

    pub fn time_left(&self) -> Duration {
        self.time_left
    }

    pub fn total_left(&self) -> Duration {
        self.total_left
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_auto_next(&self) -> bool {
        self.auto_next
    }

    pub fn time_per_question(&self) -> Duration {
        self.time_per_question
    }

    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    pub fn is_ready_to_submit(&self) -> bool {
        self.ready_to_submit
    }

    pub fn is_out_of_time(&self) -> bool {
        self.total_left.is_zero() || (self.is_last_question() && self.time_left.is_zero())
    }

    fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.quiz.questions.len()
    }

    fn announce_question(&self) {
        if let Some(question) = self.current_question() {
            self.output.say(&Message::QuestionBegins(
                self.current_index + 1,
                self.quiz.questions.len(),
                question.clone(),
            ));
        }
    }

    fn mark_ready_to_submit(&mut self) {
        if !self.ready_to_submit {
            self.ready_to_submit = true;
            self.output.say(&Message::ReadyToSubmit);
        }
    }

    fn move_to(&mut self, index: usize) {
        self.current_index = index;
        self.time_left = self.time_per_question;
        self.announce_question();
    }

    fn print_time_remaining(&self, before: Duration, after: Duration) {
        let threshold = self.settings.warning_threshold;
        if before > threshold && after <= threshold && !after.is_zero() {
            self.output.say(&Message::TimeRemaining(threshold));
        }
    }

    pub fn begin(&mut self) {
        self.output.say(&Message::QuizBegins(
            self.quiz.title.clone(),
            self.quiz.questions.len(),
            self.total_left,
        ));
        self.announce_question();
        if self.paused {
            self.output.say(&Message::SessionPaused);
        }
    }

    pub fn tick(&mut self, dt: Duration) {
        if self.paused || self.ready_to_submit || self.quiz.questions.is_empty() {
            return;
        }

        let time_left_before = self.time_left;
        self.time_left = self.time_left.saturating_sub(dt);
        self.total_left = self.total_left.saturating_sub(dt);
        self.print_time_remaining(time_left_before, self.time_left);

        if self.time_left.is_zero() {
            debug!("Question {} timed out", self.current_index + 1);
            self.output.say(&Message::TimeUp(self.current_index + 1));
            if self.is_last_question() {
                self.mark_ready_to_submit();
                return;
            }
            self.move_to(self.current_index + 1);
        }

        if self.total_left.is_zero() {
            self.output.say(&Message::TotalTimeUp);
            self.mark_ready_to_submit();
        }
    }

    pub fn select(&mut self, option_index: usize) -> Result<()> {
        let answer = self
            .current_question()
            .context("This quiz has no questions")?
            .options
            .get(option_index)
            .cloned()
            .ok_or_else(|| anyhow!("There is no option {}", option_index + 1))?;
        self.answers[self.current_index] = Some(answer.clone());
        self.output.say(&Message::AnswerSelected(answer));
        if self.auto_next {
            self.next();
        }
        Ok(())
    }

    pub fn next(&mut self) {
        if self.is_last_question() {
            self.mark_ready_to_submit();
        } else {
            self.move_to(self.current_index + 1);
        }
    }

    pub fn previous(&mut self) -> Result<()> {
        if self.current_index == 0 {
            return Err(anyhow!("Already at the first question"));
        }
        self.ready_to_submit = false;
        self.move_to(self.current_index - 1);
        Ok(())
    }

    /// Goes back to answering after declining to submit, as long as time remains.
    pub fn keep_answering(&mut self) -> Result<()> {
        if self.is_out_of_time() {
            return Err(anyhow!("Time is up, the quiz must be submitted"));
        }
        self.ready_to_submit = false;
        Ok(())
    }

    pub fn toggle_favorite(&mut self) -> Result<bool> {
        let favorite = self
            .favorites
            .get_mut(self.current_index)
            .context("This quiz has no questions")?;
        *favorite = !*favorite;
        let favorite = *favorite;
        self.output.say(&Message::FavoriteToggled(favorite));
        Ok(favorite)
    }

    pub fn set_note(&mut self, note: &str) -> Result<()> {
        let slot = self
            .notes
            .get_mut(self.current_index)
            .context("This quiz has no questions")?;
        *slot = note.trim().to_owned();
        self.output.say(&Message::NoteSaved);
        Ok(())
    }

    pub fn toggle_auto_next(&mut self) -> bool {
        self.auto_next = !self.auto_next;
        self.output.say(&Message::AutoNextToggled(self.auto_next));
        self.auto_next
    }

    /// Sets the per-question time, clamped to 5..=300 seconds, and restarts the
    /// current question's clock with it.
    pub fn set_time_per_question(&mut self, secs: u64) -> Duration {
        self.time_per_question = clamp_secs(secs, &TIME_PER_QUESTION_RANGE_SECS);
        self.time_left = self.time_per_question;
        self.announce_timers();
        self.time_per_question
    }

    /// Overrides the quiz time, clamped to 30..=36000 seconds. The overall clock
    /// restarts from the new total.
    pub fn set_total_time(&mut self, secs: u64) -> Duration {
        self.total_time = clamp_secs(secs, &TOTAL_TIME_RANGE_SECS);
        self.total_left = self.total_time;
        self.announce_timers();
        self.total_time
    }

    fn announce_timers(&self) {
        debug!(
            "Timers set to {:?} per question and {:?} overall",
            self.time_per_question, self.total_time
        );
        self.output.say(&Message::TimersChanged(
            self.time_per_question,
            self.total_left,
        ));
    }

    pub fn pause(&mut self) -> Result<()> {
        if self.paused {
            return Err(anyhow!("The quiz is already paused"));
        }
        self.paused = true;
        self.output.say(&Message::SessionPaused);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if !self.paused {
            return Err(anyhow!("The quiz is not paused"));
        }
        self.paused = false;
        self.output.say(&Message::SessionResumed);
        Ok(())
    }

    pub fn snapshot(&self, session_id: &str) -> Draft {
        Draft {
            session_id: session_id.to_owned(),
            quiz_id: self.quiz.id.clone(),
            quiz_title: self.quiz.title.clone(),
            total_questions: self.quiz.questions.len(),
            current_index: self.current_index,
            answers: self.answers.clone(),
            favorites: self.favorites.clone(),
            notes: self.notes.clone(),
            per_question_secs: Some(whole_secs(self.time_per_question)),
            total_secs: Some(whole_secs(self.total_time)),
            total_left_secs: Some(whole_secs(self.total_left)),
            time_left_secs: Some(whole_secs(self.time_left)),
            paused: self.paused,
            auto_next: self.auto_next,
        }
    }

    pub fn finish(self, session_id: &str) -> ResultRecord {
        let questions: Vec<AnsweredQuestion> = self
            .quiz
            .questions
            .iter()
            .zip(&self.answers)
            .map(|(question, answer)| AnsweredQuestion::new(question, answer.as_deref()))
            .collect();
        let score = self
            .quiz
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(question, answer)| {
                answer
                    .as_deref()
                    .map_or(false, |answer| question.is_answer_correct(answer))
            })
            .count();
        let skipped_count = self.answers.iter().filter(|a| a.is_none()).count();
        let total_questions = self.quiz.questions.len();
        let total_secs = whole_secs(self.total_time);
        let total_left_secs = whole_secs(self.total_left);
        let time_used_secs = total_secs.saturating_sub(total_left_secs);

        let record = ResultRecord {
            session_id: session_id.to_owned(),
            quiz_id: Some(self.quiz.id.clone()),
            quiz_title: self.quiz.title.clone(),
            score,
            total_questions,
            skipped_count,
            wrong_count: total_questions - score - skipped_count,
            favorite_count: self.favorites.iter().filter(|f| **f).count(),
            answers: self.answers.clone(),
            correct_answers: self
                .quiz
                .questions
                .iter()
                .map(|q| q.correct_answer.clone())
                .collect(),
            notes: self.notes.clone(),
            total_secs,
            total_left_secs,
            time_used_secs,
            wrong_questions: questions
                .iter()
                .filter(|q| q.is_answered() && !q.is_correct())
                .cloned()
                .collect(),
            favorite_questions: self
                .quiz
                .questions
                .iter()
                .zip(&self.favorites)
                .filter(|(_, favorite)| **favorite)
                .map(|(q, _)| q.question.clone())
                .collect(),
            questions,
            timestamp: Utc::now(),
        };

        self.output.say(&Message::QuizResults(QuizSummary {
            title: record.quiz_title.clone(),
            score: record.score,
            total_questions: record.total_questions,
            skipped_count: record.skipped_count,
            wrong_count: record.wrong_count,
            percentage: record.percentage(),
            time_used: Duration::from_secs(record.time_used_secs),
        }));
        info!(
            "Finished {:?} with {}/{}",
            record.quiz_title, record.score, record.total_questions
        );
        record
    }
}

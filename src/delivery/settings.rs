use std::cmp::max;
use std::ops::RangeInclusive;
use std::time::Duration;

pub const DEFAULT_TIME_PER_QUESTION_SECS: u64 = 15;
/// Stored per-question times at or below this are ignored.
pub const STORED_TIME_PER_QUESTION_FLOOR_SECS: u64 = 3;
pub const TIME_PER_QUESTION_RANGE_SECS: RangeInclusive<u64> = 5..=300;
pub const TOTAL_TIME_RANGE_SECS: RangeInclusive<u64> = 30..=36000;

/// Clamps a number of seconds into an inclusive range.
pub fn clamp_secs(secs: u64, range: &RangeInclusive<u64>) -> Duration {
    Duration::from_secs(secs.clamp(*range.start(), *range.end()))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub time_per_question: Duration,
    pub minimum_total_time: Duration,
    pub warning_threshold: Duration,
    /// Move to the next question as soon as an answer is picked.
    pub auto_next: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            time_per_question: Duration::from_secs(DEFAULT_TIME_PER_QUESTION_SECS),
            minimum_total_time: Duration::from_secs(30),
            warning_threshold: Duration::from_secs(10),
            auto_next: false,
        }
    }
}

impl Settings {
    pub fn with_time_per_question(time_per_question: Duration) -> Self {
        Settings {
            time_per_question,
            ..Default::default()
        }
    }

    pub fn total_time(&self, question_count: usize) -> Duration {
        let question_count = max(question_count, 1) as u32;
        max(
            self.time_per_question * question_count,
            self.minimum_total_time,
        )
    }
}

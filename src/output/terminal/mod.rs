use std::time::Duration;

use crate::output::{Message, SessionOutput};

const OPTION_LABELS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

/// Renders session messages as plain lines on stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalOutput;

pub fn format_clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub fn option_label(index: usize) -> String {
    OPTION_LABELS
        .get(index)
        .map(|c| c.to_string())
        .unwrap_or_else(|| (index + 1).to_string())
}

fn interpret_message(message: &Message) -> String {
    use Message::*;
    match message {
        AnswerSelected(answer) => format!("✏️ Selected: {}", answer),
        AutoNextToggled(true) => "⏩ Auto next is on.".into(),
        AutoNextToggled(false) => "Auto next is off.".into(),
        FavoriteToggled(true) => "⭐ Marked as favorite.".into(),
        FavoriteToggled(false) => "Removed from favorites.".into(),
        NoteSaved => "📝 Note saved.".into(),
        QuestionBegins(number, count, question) => {
            let mut text = format!("\nQuestion {}/{}: {}", number, count, question.question);
            for (index, option) in question.options.iter().enumerate() {
                text += &format!("\n  {}) {}", option_label(index), option);
            }
            for media in &question.media {
                text += &format!("\n  🖼️ {}", media);
            }
            text
        }
        QuizBegins(title, count, total_time) => format!(
            "📋 {} - {} question(s), {} on the clock.\nAnswer with a letter or number. \
             `n`/`p` move, `*` favorites, `note <text>` annotates, `autonext` toggles moving on \
             after an answer, `time <secs>` and `total <secs>` adjust the timers, \
             `status`, `pause`, `resume`, `submit`, `quit`.",
            title,
            count,
            format_clock(*total_time)
        ),
        QuizResults(summary) => {
            let mut text = format!(
                "🎊 {}: {}/{} correct ({}%).",
                summary.title, summary.score, summary.total_questions, summary.percentage
            );
            text += &format!(
                "\n✅ {} correct ❌ {} wrong ⏭️ {} skipped 🕒 {} used",
                summary.score,
                summary.wrong_count,
                summary.skipped_count,
                format_clock(summary.time_used)
            );
            text
        }
        ReadyToSubmit => "📨 Ready to submit.".into(),
        SessionPaused => "⏸️ Quiz paused, type `resume` to continue.".into(),
        SessionResumed => "▶️ Quiz resumed.".into(),
        TimeRemaining(duration) => format!("🕒 Only {} seconds left!", duration.as_secs()),
        TimersChanged(per_question, total) => format!(
            "🕒 {} per question, {} left overall.",
            format_clock(*per_question),
            format_clock(*total)
        ),
        TimeUp(number) => format!("⏰ Time's up for question {}.", number),
        TotalTimeUp => "⏰ The quiz is out of time.".into(),
    }
}

impl SessionOutput for TerminalOutput {
    fn say(&self, message: &Message) {
        println!("{}", interpret_message(message));
    }
}

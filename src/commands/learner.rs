use anyhow::{anyhow, Context, Result};
use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::commands::is_yes;
use crate::config;
use crate::delivery::replay::{build_replay, ReplayKind};
use crate::delivery::session::Session;
use crate::output::terminal::{format_clock, option_label, TerminalOutput};
use crate::output::SessionOutput;
use crate::quiz::Quiz;
use crate::store::drafts::{self, Draft, DraftStore};
use crate::store::folders::QuizStore;
use crate::store::results::ResultLog;
use crate::store::KeyValueStore;

const TICK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Submit,
    Quit,
}

fn answer_index(input: &str) -> Option<usize> {
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ 'a'..='f'), None) => Some(c as usize - 'a' as usize),
        _ => input
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(|n| n - 1),
    }
}

fn print_status<O: SessionOutput>(session: &Session<O>) {
    let count = session.quiz().questions.len();
    println!(
        "Question {}/{} 🕒 {} left on this question, {} overall{}",
        session.current_index() + 1,
        count,
        format_clock(session.time_left()),
        format_clock(session.total_left()),
        if session.is_paused() { " (paused)" } else { "" }
    );
    let selected = session.current_answer().and_then(|answer| {
        session
            .current_question()
            .and_then(|question| question.option_index(answer))
            .map(|index| format!("{}) {}", option_label(index), answer))
    });
    match selected {
        Some(selected) => println!("Your answer: {}", selected),
        None => println!("No answer yet."),
    }
    println!(
        "Timers: {} per question, {} in total. Auto next is {}.",
        format_clock(session.time_per_question()),
        format_clock(session.total_time()),
        if session.is_auto_next() { "on" } else { "off" }
    );
}

fn parse_secs(value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{:?} is not a number of seconds", value.trim()))
}

/// Applies one line typed during play.
pub fn handle_input<O: SessionOutput>(session: &mut Session<O>, line: &str) -> Result<Flow> {
    let line = line.trim();
    let lowered = line.to_lowercase();
    if let Some(index) = answer_index(&lowered) {
        session.select(index)?;
        return Ok(Flow::Continue);
    }
    match lowered.as_str() {
        "" => {}
        "n" | "next" => session.next(),
        "p" | "prev" | "previous" => session.previous()?,
        "*" | "fav" | "favorite" => {
            session.toggle_favorite()?;
        }
        "autonext" => {
            session.toggle_auto_next();
        }
        "pause" => session.pause()?,
        "resume" => session.resume()?,
        "s" | "status" => print_status(session),
        "submit" => return Ok(Flow::Submit),
        "q" | "quit" => return Ok(Flow::Quit),
        _ => match line.split_once(char::is_whitespace) {
            Some((command, note)) if command.eq_ignore_ascii_case("note") => {
                session.set_note(note)?
            }
            Some((command, secs)) if command.eq_ignore_ascii_case("time") => {
                session.set_time_per_question(parse_secs(secs)?);
            }
            Some((command, secs)) if command.eq_ignore_ascii_case("total") => {
                session.set_total_time(parse_secs(secs)?);
            }
            _ => return Err(anyhow!("Unknown input {:?}", line)),
        },
    }
    Ok(Flow::Continue)
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if sender.send(line).is_err() {
                break;
            }
        }
    });
    receiver
}

struct Persistence<'a, S: KeyValueStore> {
    session_id: &'a str,
    drafts: DraftStore<S>,
    last_saved: Option<Draft>,
}

impl<'a, S: KeyValueStore> Persistence<'a, S> {
    fn save<O: SessionOutput>(&mut self, session: &Session<O>) -> Result<()> {
        let draft = session.snapshot(self.session_id);
        if self.last_saved.as_ref() != Some(&draft) {
            self.drafts.put(&draft)?;
            self.last_saved = Some(draft);
        }
        Ok(())
    }
}

fn run_session<S: KeyValueStore + ?Sized>(
    store: &S,
    mut session: Session<TerminalOutput>,
) -> Result<()> {
    let session_id = drafts::session_id(store)?;
    let mut persistence = Persistence {
        session_id: &session_id,
        drafts: DraftStore::new(store),
        last_saved: None,
    };
    let input = spawn_stdin_reader();

    session.begin();
    persistence.save(&session)?;
    let mut last_tick = Instant::now();
    loop {
        if session.is_ready_to_submit() {
            if session.is_out_of_time() {
                break;
            }
            println!("Submit your answers? [y/N]");
            let answer = input.recv().unwrap_or_default();
            if is_yes(&answer) {
                break;
            }
            session.keep_answering()?;
            last_tick = Instant::now();
        }

        match input.recv_timeout(TICK_INTERVAL) {
            Ok(line) => match handle_input(&mut session, &line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Submit) => break,
                Ok(Flow::Quit) => {
                    persistence.save(&session)?;
                    println!("Progress saved. Use `quizdesk resume` to continue.");
                    return Ok(());
                }
                Err(e) => println!("{}", e),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Input closed during play");
                persistence.save(&session)?;
                return Ok(());
            }
        }

        let now = Instant::now();
        session.tick(now - last_tick);
        last_tick = now;
        persistence.save(&session)?;
    }

    persistence.drafts.remove(&session_id)?;
    let record = session.finish(&session_id);
    ResultLog::new(store).append(record)?;
    Ok(())
}

fn start<S: KeyValueStore + ?Sized>(store: &S, quiz: Quiz) -> Result<()> {
    if quiz.questions.is_empty() {
        return Err(anyhow!("Quiz {:?} has no questions", quiz.title));
    }
    let session_id = drafts::session_id(store)?;
    if let Some(draft) = DraftStore::new(store).get(&session_id)? {
        info!("Replacing unfinished draft of {:?}", draft.quiz_title);
        println!("Your unfinished attempt at {:?} will be replaced.", draft.quiz_title);
    }
    let settings = config::load_settings(store)?;
    run_session(store, Session::new(quiz, settings, TerminalOutput))
}

pub fn play<S: KeyValueStore + ?Sized>(store: &S, quiz_id: &str) -> Result<()> {
    let entry = QuizStore::new(store)
        .find_quiz(quiz_id)?
        .with_context(|| format!("Quiz {} not found", quiz_id))?;
    start(store, entry.quiz)
}

pub fn resume<S: KeyValueStore + ?Sized>(store: &S) -> Result<()> {
    let session_id = drafts::session_id(store)?;
    let draft = DraftStore::new(store)
        .get(&session_id)?
        .context("There is no unfinished quiz to resume")?;
    let entry = QuizStore::new(store)
        .find_quiz(&draft.quiz_id)?
        .with_context(|| {
            format!(
                "Quiz {:?} no longer exists. Use `quizdesk draft discard`.",
                draft.quiz_title
            )
        })?;
    let settings = config::load_settings(store)?;
    let session = Session::restore(entry.quiz, &draft, settings, TerminalOutput)?;
    run_session(store, session)
}

pub fn discard_draft<S: KeyValueStore + ?Sized>(store: &S) -> Result<()> {
    let session_id = drafts::session_id(store)?;
    if DraftStore::new(store).remove(&session_id)? {
        println!("Unfinished quiz discarded.");
    } else {
        println!("There is no unfinished quiz.");
    }
    Ok(())
}

pub fn replay<S: KeyValueStore + ?Sized>(store: &S, kind: ReplayKind) -> Result<()> {
    let session_id = drafts::session_id(store)?;
    let result = ResultLog::new(store)
        .latest_for_session(&session_id)?
        .context("Finish a quiz before replaying it")?;
    let available = QuizStore::new(store).all_quizzes()?;
    let quiz = build_replay(&result, &available, kind)?;
    start(store, quiz)
}

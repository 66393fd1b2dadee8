use std::io::Write;
use std::path::Path;
use std::time::Duration;

use super::learner::{handle_input, Flow};
use super::*;
use crate::delivery::session::Session;
use crate::delivery::Settings;
use crate::output::mock::MockSessionOutput;
use crate::output::Message;
use crate::quiz::{Question, Quiz};
use crate::store::drafts::DraftStore;
use crate::store::folders::QuizStore;
use crate::store::memory::MemoryStore;
use crate::store::results::ResultLog;

fn session() -> (Session<MockSessionOutput>, MockSessionOutput) {
    let questions = ["First", "Second"]
        .iter()
        .map(|text| Question {
            question: text.to_string(),
            options: vec!["one".to_owned(), "two".to_owned(), "three".to_owned()],
            correct_answer: "two".to_owned(),
            explanation: String::new(),
            media: Vec::new(),
        })
        .collect();
    let output = MockSessionOutput::new();
    let session = Session::new(
        Quiz::new("Numbers", questions),
        Settings::default(),
        output.clone(),
    );
    (session, output)
}

#[test]
fn admin_commands_require_admin_role() {
    let store = MemoryStore::new();
    assert!(require_admin(&store).is_err());
    config::save_role(&store, Role::Learner).unwrap();
    assert!(require_admin(&store).is_err());
    assert!(require_learner(&store).is_ok());
    config::save_role(&store, Role::Admin).unwrap();
    assert!(require_admin(&store).is_ok());
    assert!(require_learner(&store).is_err());
}

#[test]
fn recognizes_yes() {
    assert!(is_yes("y"));
    assert!(is_yes(" YES "));
    assert!(!is_yes(""));
    assert!(!is_yes("nope"));
}

#[test]
fn letters_and_numbers_select_answers() {
    let (mut session, output) = session();
    assert_eq!(handle_input(&mut session, "B").unwrap(), Flow::Continue);
    assert_eq!(session.current_answer(), Some("two"));
    handle_input(&mut session, "3").unwrap();
    assert_eq!(session.current_answer(), Some("three"));
    assert!(handle_input(&mut session, "d").is_err());
    assert!(handle_input(&mut session, "0").is_err());
    assert!(output.contains_message(&Message::AnswerSelected("three".to_owned())));
}

#[test]
fn navigation_and_notes() {
    let (mut session, output) = session();
    assert!(handle_input(&mut session, "p").is_err());
    handle_input(&mut session, "n").unwrap();
    assert_eq!(session.current_index(), 1);
    handle_input(&mut session, "*").unwrap();
    handle_input(&mut session, "note  check units").unwrap();
    assert_eq!(session.snapshot("s").notes[1], "check units");
    assert!(output.contains_message(&Message::FavoriteToggled(true)));
    handle_input(&mut session, "prev").unwrap();
    assert_eq!(session.current_index(), 0);
    handle_input(&mut session, "pause").unwrap();
    assert!(session.is_paused());
    handle_input(&mut session, "resume").unwrap();
    assert!(handle_input(&mut session, "dance").is_err());
}

#[test]
fn adjusting_timers_and_auto_next() {
    let (mut session, output) = session();
    handle_input(&mut session, "autonext").unwrap();
    assert!(session.is_auto_next());
    handle_input(&mut session, "a").unwrap();
    assert_eq!(session.current_index(), 1);

    handle_input(&mut session, "total 90").unwrap();
    assert_eq!(session.total_left(), Duration::from_secs(90));
    handle_input(&mut session, "TIME 400").unwrap();
    assert_eq!(session.time_left(), Duration::from_secs(300));
    assert!(output.contains_message(&Message::TimersChanged(
        Duration::from_secs(300),
        Duration::from_secs(90)
    )));
    assert!(handle_input(&mut session, "total soon").is_err());
}

#[test]
fn submit_and_quit() {
    let (mut session, _) = session();
    assert_eq!(handle_input(&mut session, "").unwrap(), Flow::Continue);
    assert_eq!(handle_input(&mut session, "submit").unwrap(), Flow::Submit);
    assert_eq!(handle_input(&mut session, "quit").unwrap(), Flow::Quit);
}

#[test]
fn creates_and_deletes_folders() {
    let store = MemoryStore::new();
    admin::folder(
        &store,
        admin::FolderCommand::Create {
            name: "History".to_owned(),
            parent: None,
        },
    )
    .unwrap();
    let folders = QuizStore::new(&store).folders().unwrap();
    assert_eq!(folders[0].name, "History");

    admin::folder(
        &store,
        admin::FolderCommand::Delete {
            id: folders[0].id.clone(),
            yes: true,
        },
    )
    .unwrap();
    assert!(QuizStore::new(&store).folders().unwrap().is_empty());
}

#[test]
fn import_saves_into_folder() {
    let store = MemoryStore::new();
    let folder = QuizStore::new(&store).create_folder("Geo", None).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Capitals.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "Question,OptionA,OptionB,CorrectAnswer").unwrap();
    writeln!(file, "Capital of Italy?,Rome,Oslo,A").unwrap();
    drop(file);

    admin::import(&store, &path, &folder.id, None, true).unwrap();
    let quizzes = QuizStore::new(&store).list_by_folder(&folder.id).unwrap();
    assert_eq!(quizzes.len(), 1);
    assert_eq!(quizzes[0].title, "Capitals");
    assert_eq!(quizzes[0].questions[0].correct_answer, "Rome");
}

#[test]
fn import_needs_a_folder() {
    let store = MemoryStore::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quiz.csv");
    std::fs::write(&path, "Question,OptionA,OptionB,CorrectAnswer\n").unwrap();
    assert!(admin::import(&store, &path, "missing", None, true).is_err());
}

#[test]
fn import_checks_the_folder_before_reading_the_file() {
    let store = MemoryStore::new();
    QuizStore::new(&store).create_folder("Geo", None).unwrap();
    let error = admin::import(&store, Path::new("does-not-exist.csv"), "missing", None, true)
        .unwrap_err();
    assert_eq!(error.to_string(), "Folder missing not found");
}

#[test]
fn clearing_results_and_drafts() {
    let store = MemoryStore::new();
    admin::clear_results(&store, true).unwrap();
    assert!(ResultLog::new(&store).list(None).unwrap().is_empty());
    admin::results(&store, Some("Unknown")).unwrap();

    let (session, _) = session();
    let session_id = crate::store::drafts::session_id(&store).unwrap();
    DraftStore::new(&store)
        .put(&session.snapshot(&session_id))
        .unwrap();
    learner::discard_draft(&store).unwrap();
    assert_eq!(DraftStore::new(&store).get(&session_id).unwrap(), None);
}

#[test]
fn replay_needs_a_finished_quiz() {
    let store = MemoryStore::new();
    assert!(learner::replay(&store, ReplayKind::All).is_err());
    assert!(learner::resume(&store).is_err());
    assert!(learner::play(&store, "missing").is_err());
}

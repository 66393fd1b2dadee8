use super::*;

fn capital_of_france() -> QuestionDraft {
    QuestionDraft {
        question: " Capital of France? ".to_owned(),
        options: "Berlin, Madrid,Paris , ,Rome".to_owned(),
        correct_answer: "Paris".to_owned(),
        explanation: "".to_owned(),
        media: "https://example.com/a.jpg; https://example.com/b.jpg,".to_owned(),
    }
}

#[test]
fn draft_becomes_question() {
    let question = Question::try_from(capital_of_france()).unwrap();
    assert_eq!(question.question, "Capital of France?");
    assert_eq!(question.options, ["Berlin", "Madrid", "Paris", "Rome"]);
    assert_eq!(question.correct_answer, "Paris");
    assert_eq!(
        question.media,
        ["https://example.com/a.jpg", "https://example.com/b.jpg"]
    );
}

#[test]
fn draft_requires_fields() {
    let draft = QuestionDraft {
        correct_answer: "".to_owned(),
        ..capital_of_france()
    };
    assert_eq!(
        Question::try_from(draft),
        Err(AuthoringError::MissingFields)
    );
}

#[test]
fn draft_correct_answer_is_case_sensitive() {
    let draft = QuestionDraft {
        correct_answer: "paris".to_owned(),
        ..capital_of_france()
    };
    assert_eq!(
        Question::try_from(draft),
        Err(AuthoringError::CorrectAnswerNotAnOption)
    );
}

#[test]
fn manual_quiz_needs_title_and_questions() {
    assert_eq!(
        ManualQuiz::new("Geography").build().unwrap_err(),
        AuthoringError::NoQuestions
    );

    let mut quiz = ManualQuiz::new("   ");
    quiz.add_question(capital_of_france()).unwrap();
    assert_eq!(quiz.build().unwrap_err(), AuthoringError::MissingTitle);
}

#[test]
fn manual_quiz_builds() {
    let mut quiz = ManualQuiz::new(" Geography ");
    quiz.add_question(capital_of_france()).unwrap();
    assert!(quiz.add_question(QuestionDraft::default()).is_err());
    assert_eq!(quiz.len(), 1);

    let quiz = quiz.build().unwrap();
    assert_eq!(quiz.title, "Geography");
    assert_eq!(quiz.questions.len(), 1);
    assert!(quiz.id.starts_with("quiz-"));
}

#[test]
fn question_serializes_in_camel_case() {
    let question = Question::try_from(capital_of_france()).unwrap();
    let json = serde_json::to_value(&question).unwrap();
    assert_eq!(json["correctAnswer"], "Paris");
}

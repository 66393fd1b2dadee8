use super::header::{detect_header_row, normalize_label, RoleMap};
use super::row::resolve_correct_answer;
use super::*;

fn grid(rows: &[&[&str]]) -> CellGrid {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

const LETTERED_HEADER: &[&str] = &[
    "Question",
    "OptionA",
    "OptionB",
    "OptionC",
    "OptionD",
    "CorrectAnswer",
];

#[test]
fn normalizes_labels() {
    assert_eq!(normalize_label(" Correct Answer "), "correctanswer");
    assert_eq!(normalize_label("Option-1"), "option1");
}

#[test]
fn non_ascii_label_characters_are_dropped() {
    assert_eq!(normalize_label("Ｑ"), "");
    assert_eq!(normalize_label("Q²"), "q");
    assert_eq!(normalize_label("Média URLs"), "mdiaurls");
}

#[test]
fn fullwidth_option_labels_are_not_option_columns() {
    let grid = grid(&[&["Question", "Ａ", "Ｂ", "Answer"], &["2+2?", "3", "4", "B"]]);
    let roles = RoleMap::from_headers(&grid[0]);
    assert_eq!(roles.discrete_options().count(), 0);
    let error = parse(&grid).unwrap_err();
    assert!(matches!(error, ImportError::NoQuestionsParsed(_)));
    assert_eq!(error.diagnostics().rows_considered, Some(1));
}

#[test]
fn header_after_banner_row() {
    let grid = grid(&[
        &["Weekly Science Quiz"],
        &["Question", "OptionA", "OptionB", "CorrectAnswer"],
        &["2+2?", "3", "4", "B"],
    ]);
    assert_eq!(detect_header_row(&grid), 1);
    assert_eq!(parse(&grid).unwrap().header_row_index, 1);
}

#[test]
fn header_falls_back_to_first_row() {
    let grid = grid(&[&["Banner"], &["Something", "Else"], &["More"]]);
    assert_eq!(detect_header_row(&grid), 0);
}

#[test]
fn header_needs_option_or_answer_label() {
    let grid = grid(&[
        &["Title", "Author"],
        &["Prompt", "Key"],
        &["What?", "A"],
    ]);
    assert_eq!(detect_header_row(&grid), 1);
}

#[test]
fn header_only_scans_first_ten_rows() {
    let mut rows: Vec<Vec<String>> = (0..10).map(|i| vec![format!("banner {}", i)]).collect();
    rows.push(strings(&["Question", "OptionA", "OptionB", "CorrectAnswer"]));
    assert_eq!(detect_header_row(&rows), 0);
}

#[test]
fn roles_tolerate_case_and_spaces() {
    let roles = RoleMap::from_headers(&strings(&["Q ", "Option 1", "Option 2", "Correct Answer"]));
    assert_eq!(roles.question, Some(0));
    assert_eq!(roles.numbered_options[0], Some(1));
    assert_eq!(roles.numbered_options[1], Some(2));
    assert_eq!(roles.correct_answer, Some(3));
    assert_eq!(roles.explanation, None);
    assert_eq!(roles.combined_options, None);
}

#[test]
fn roles_follow_candidate_priority() {
    let roles = RoleMap::from_headers(&strings(&[
        "Title", "Prompt", "Key", "Answer", "Choices", "Img", "Notes",
    ]));
    assert_eq!(roles.question, Some(1));
    assert_eq!(roles.correct_answer, Some(3));
    assert_eq!(roles.combined_options, Some(4));
    assert_eq!(roles.media, Some(5));
    assert_eq!(roles.explanation, Some(6));
}

#[test]
fn letter_correct_answer() {
    let grid = grid(&[LETTERED_HEADER, &["2+2?", "3", "4", "5", "6", "B"]]);
    let sheet = parse(&grid).unwrap();
    assert_eq!(sheet.questions[0].correct_answer, "4");
    assert_eq!(sheet.questions[0].options, ["3", "4", "5", "6"]);
}

#[test]
fn embedded_letter_correct_answer() {
    let options = strings(&["North", "South", "East", "West"]);
    assert_eq!(
        resolve_correct_answer("Option C", &options),
        Some("East".to_owned())
    );
    assert_eq!(resolve_correct_answer("d)", &options), Some("West".to_owned()));
}

#[test]
fn numeric_correct_answer() {
    let options = strings(&["Red", "Green", "Blue"]);
    assert_eq!(resolve_correct_answer("3", &options), Some("Blue".to_owned()));
    assert_eq!(resolve_correct_answer("2.", &options), Some("Green".to_owned()));
    assert_eq!(resolve_correct_answer("9", &options), None);
}

#[test]
fn text_correct_answer() {
    let options = strings(&["Oslo", "Rome"]);
    assert_eq!(resolve_correct_answer(" ROME ", &options), Some("Rome".to_owned()));
    assert_eq!(resolve_correct_answer("Turin", &options), None);
}

#[test]
fn letter_code_wins_over_option_text() {
    let options = strings(&["B", "A"]);
    assert_eq!(resolve_correct_answer("B", &options), Some("A".to_owned()));
}

#[test]
fn combined_and_discrete_options_deduplicate() {
    let grid = grid(&[
        &["Question", "Options", "OptionC", "Answer"],
        &["Capital of the UK?", "Paris, Paris, London", "paris", "London"],
    ]);
    let sheet = parse(&grid).unwrap();
    assert_eq!(sheet.questions[0].options, ["Paris", "London"]);
    assert_eq!(sheet.questions[0].correct_answer, "London");
}

#[test]
fn combined_options_split_on_every_separator() {
    let grid = grid(&[
        &["Question", "Choices", "Answer"],
        &["Pick one", "one\ntwo;three|four", "4"],
    ]);
    let sheet = parse(&grid).unwrap();
    assert_eq!(sheet.questions[0].options, ["one", "two", "three", "four"]);
    assert_eq!(sheet.questions[0].correct_answer, "four");
}

#[test]
fn rows_with_one_option_are_dropped() {
    let grid = grid(&[
        LETTERED_HEADER,
        &["Lonely?", "yes", "", "", "", "A"],
        &["2+2?", "3", "4", "", "", "B"],
    ]);
    let sheet = parse(&grid).unwrap();
    assert_eq!(sheet.questions.len(), 1);
    assert_eq!(sheet.questions[0].question, "2+2?");
    assert_eq!(sheet.rows_considered, 2);
}

#[test]
fn blank_question_rows_are_not_considered() {
    let grid = grid(&[
        LETTERED_HEADER,
        &["", "x", "y", "", "", "A"],
        &["   "],
        &["2+2?", "3", "4", "", "", "B"],
    ]);
    let sheet = parse(&grid).unwrap();
    assert_eq!(sheet.rows_considered, 1);
}

#[test]
fn ragged_rows_read_missing_cells_as_empty() {
    let grid = grid(&[
        &["Question", "OptionA", "OptionB", "CorrectAnswer", "Explanation", "MediaURLs"],
        &["Short row?", "yes", "no", "A"],
    ]);
    let question = &parse(&grid).unwrap().questions[0];
    assert_eq!(question.correct_answer, "yes");
    assert_eq!(question.explanation, "");
    assert!(question.media.is_empty());
}

#[test]
fn explanation_and_media_are_read() {
    let grid = grid(&[
        &["Question", "OptionA", "OptionB", "CorrectAnswer", "Explanation", "MediaURLs"],
        &[
            "Sky color?",
            "Blue",
            "Green",
            "A",
            " Rayleigh scattering ",
            "https://a.example/1.png, https://a.example/2.png | https://a.example/3.png",
        ],
    ]);
    let question = &parse(&grid).unwrap().questions[0];
    assert_eq!(question.explanation, "Rayleigh scattering");
    assert_eq!(
        question.media,
        [
            "https://a.example/1.png",
            "https://a.example/2.png",
            "https://a.example/3.png"
        ]
    );
}

#[test]
fn no_resolvable_answers_is_an_error() {
    let grid = grid(&[
        LETTERED_HEADER,
        &["2+2?", "3", "4", "5", "6", ""],
        &["3+3?", "6", "7", "8", "9", "Z"],
    ]);
    let error = parse(&grid).unwrap_err();
    assert!(matches!(error, ImportError::NoQuestionsParsed(_)));
    let diagnostics = error.diagnostics();
    assert_eq!(diagnostics.status, ImportStatus::Error);
    assert_eq!(diagnostics.parsed_count, Some(0));
    assert_eq!(diagnostics.rows_considered, Some(2));
    assert_eq!(diagnostics.header_row_index, Some(0));
    assert_eq!(diagnostics.headers, strings(LETTERED_HEADER));
    assert!(diagnostics.note.is_some());
}

#[test]
fn empty_grid_is_an_error() {
    let error = parse(&CellGrid::new()).unwrap_err();
    assert_eq!(error.diagnostics().rows_considered, Some(0));
    assert!(error.diagnostics().headers.is_empty());
}

#[test]
fn parsing_is_repeatable() {
    let grid = grid(&[
        &["Quiz night"],
        LETTERED_HEADER,
        &["2+2?", "3", "4", "5", "6", "B"],
        &["Odd one?", "1", "2", "", "", "1"],
    ]);
    assert_eq!(parse(&grid).unwrap(), parse(&grid).unwrap());
}

#[test]
fn success_diagnostics() {
    let grid = grid(&[LETTERED_HEADER, &["2+2?", "3", "4", "5", "6", "B"]]);
    let diagnostics = parse(&grid).unwrap().diagnostics(Some("math.csv"));
    assert_eq!(diagnostics.status, ImportStatus::Ok);
    assert_eq!(diagnostics.file_name.as_deref(), Some("math.csv"));
    assert_eq!(diagnostics.parsed_count, Some(1));
    assert_eq!(diagnostics.rows_considered, Some(1));
}

#[test]
fn suggested_titles() {
    assert_eq!(suggested_title("Science Quiz.xlsx"), "Science Quiz");
    assert_eq!(suggested_title("/tmp/uploads/week.1.csv"), "week.1");
    assert_eq!(suggested_title("notes"), "Imported Quiz");
    assert_eq!(suggested_title(".csv"), "Imported Quiz");
}

#[test]
fn template_parses() {
    let mut bytes = Vec::new();
    template::write_template(&mut bytes).unwrap();
    let grid = decode::decode_csv(bytes.as_slice()).unwrap();
    let sheet = parse(&grid).unwrap();
    assert_eq!(sheet.headers, template::TEMPLATE_HEADERS);
    assert_eq!(sheet.questions.len(), 2);
    assert_eq!(sheet.questions[0].correct_answer, "4");
    assert_eq!(sheet.questions[1].correct_answer, "Paris");
    assert_eq!(
        sheet.questions[1].media,
        ["https://example.com/paris.jpg"]
    );
}

#[test]
fn csv_decoding_tolerates_ragged_rows_and_bom() {
    let source = "\u{feff}Question,OptionA,OptionB,CorrectAnswer\n\"Pick, one\",x,y\n";
    let grid = decode::decode_csv(source.as_bytes()).unwrap();
    assert_eq!(grid[0][0], "Question");
    assert_eq!(grid[1], strings(&["Pick, one", "x", "y"]));
}

#[test]
fn import_file_reports_decode_failures() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quiz.pdf");
    std::fs::write(&path, b"%PDF").unwrap();

    let error = import_file(&path).unwrap_err();
    assert!(matches!(error, ImportError::Decode { .. }));
    let diagnostics = error.diagnostics();
    assert_eq!(diagnostics.status, ImportStatus::Error);
    assert_eq!(diagnostics.file_name.as_deref(), Some("quiz.pdf"));
    assert!(diagnostics.error.is_some());
}

#[test]
fn import_file_builds_pending_import() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Science Quiz.csv");
    template::save_template(&path).unwrap();

    let report = import_file(&path).unwrap();
    assert_eq!(report.diagnostics.status, ImportStatus::Ok);
    assert_eq!(report.diagnostics.parsed_count, Some(2));
    assert_eq!(report.pending.file_name, "Science Quiz.csv");
    assert_eq!(report.pending.suggested_title(), "Science Quiz");
}

#[test]
fn import_file_names_the_file_on_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    std::fs::write(&path, "Question,OptionA,OptionB,CorrectAnswer\nQ1,only,,\n").unwrap();

    let error = import_file(&path).unwrap_err();
    assert_eq!(error.diagnostics().file_name.as_deref(), Some("empty.csv"));
    assert_eq!(error.diagnostics().rows_considered, Some(1));
}

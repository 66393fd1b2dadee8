use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use super::CellGrid;

lazy_static! {
    static ref FORBIDDEN_LABEL_CHARACTERS_REGEX: Regex = Regex::new("[^a-z0-9]").unwrap();
}

/// How many leading rows may hold banners or titles before the header row.
const HEADER_SCAN_ROWS: usize = 10;

const QUESTION_LABELS: &[&str] = &["question", "ques", "questiontext", "prompt", "title", "q"];
const EXPLANATION_LABELS: &[&str] = &[
    "explanation",
    "explain",
    "solution",
    "reason",
    "note",
    "notes",
    "explaination",
];
const MEDIA_LABELS: &[&str] = &[
    "mediaurls",
    "media",
    "image",
    "images",
    "imageurl",
    "imageurls",
    "img",
    "imgurl",
    "link",
    "links",
    "mediaurl",
];
const CORRECT_ANSWER_LABELS: &[&str] = &[
    "correctanswer",
    "answer",
    "ans",
    "correct",
    "correctoption",
    "trueanswer",
    "key",
    "rightanswer",
];
const COMBINED_OPTIONS_LABELS: &[&str] = &["options", "choices", "optionlist", "choice", "answers"];

const OPTION_LETTERS: [&str; 4] = ["a", "b", "c", "d"];
const OPTION_NUMBERS: [&str; 4] = ["1", "2", "3", "4"];
const BARE_OPTION_LABELS: &[&str] = &["a", "b", "c", "d", "e", "f", "1", "2", "3", "4", "5", "6"];

/// Lowercases a header and keeps only ASCII letters and digits.
pub fn normalize_label(label: &str) -> String {
    FORBIDDEN_LABEL_CHARACTERS_REGEX
        .replace_all(&label.to_lowercase(), "")
        .into()
}

fn is_question_label(label: &str) -> bool {
    QUESTION_LABELS.contains(&label)
        || label.contains("question")
        || label.contains("prompt")
        || label.contains("title")
}

fn is_option_label(label: &str) -> bool {
    label.starts_with("option") || BARE_OPTION_LABELS.contains(&label)
}

fn is_correct_answer_label(label: &str) -> bool {
    ["correct", "answer", "ans", "key"]
        .iter()
        .any(|needle| label.contains(needle))
}

fn looks_like_header(row: &[String]) -> bool {
    let labels: HashSet<String> = row.iter().map(|cell| normalize_label(cell)).collect();
    let has_question = labels.iter().any(|l| is_question_label(l));
    let has_option = labels.iter().any(|l| is_option_label(l));
    let has_correct_answer = labels.iter().any(|l| is_correct_answer_label(l));
    has_question && (has_option || has_correct_answer)
}

/// Index of the first row that reads like column labels, or 0 when none does.
pub fn detect_header_row(grid: &CellGrid) -> usize {
    grid.iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| looks_like_header(row))
        .unwrap_or(0)
}

/// Which column holds which part of a question.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleMap {
    pub question: Option<usize>,
    pub explanation: Option<usize>,
    pub media: Option<usize>,
    pub correct_answer: Option<usize>,
    pub combined_options: Option<usize>,
    pub lettered_options: [Option<usize>; 4],
    pub numbered_options: [Option<usize>; 4],
}

impl RoleMap {
    pub fn from_headers(headers: &[String]) -> Self {
        // Duplicate labels resolve to their rightmost column
        let index_by_label: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(index, header)| (normalize_label(header), index))
            .collect();

        let pick = |candidates: &[&str]| -> Option<usize> {
            candidates
                .iter()
                .find_map(|candidate| index_by_label.get(*candidate).copied())
        };

        let pick_option = |suffix: &str| -> Option<usize> {
            pick(&[
                format!("option{}", suffix).as_str(),
                suffix,
                format!("opt{}", suffix).as_str(),
            ])
        };

        RoleMap {
            question: pick(QUESTION_LABELS),
            explanation: pick(EXPLANATION_LABELS),
            media: pick(MEDIA_LABELS),
            correct_answer: pick(CORRECT_ANSWER_LABELS),
            combined_options: pick(COMBINED_OPTIONS_LABELS),
            lettered_options: OPTION_LETTERS.map(pick_option),
            numbered_options: OPTION_NUMBERS.map(pick_option),
        }
    }

    /// Discrete option columns in reading order: A, B, C, D then 1, 2, 3, 4.
    pub fn discrete_options(&self) -> impl Iterator<Item = usize> + '_ {
        self.lettered_options
            .iter()
            .chain(self.numbered_options.iter())
            .filter_map(|index| *index)
    }
}

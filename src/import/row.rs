use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

use super::header::RoleMap;
use crate::quiz::Question;

lazy_static! {
    static ref OPTION_SEPARATOR_REGEX: Regex = Regex::new("[\n;,|]").unwrap();
    static ref MEDIA_SEPARATOR_REGEX: Regex = Regex::new(r"[\s,;|]+").unwrap();
    static ref ANSWER_LETTER_REGEX: Regex = Regex::new("[a-f]").unwrap();
    static ref ANSWER_NUMBER_REGEX: Regex = Regex::new(r"^\d+").unwrap();
}

const MIN_OPTIONS: usize = 2;

/// Why a data row did not produce a question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowSkip {
    BlankQuestion,
    TooFewOptions(usize),
    UnresolvedCorrectAnswer(String),
}

impl fmt::Display for RowSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowSkip::BlankQuestion => write!(f, "blank question"),
            RowSkip::TooFewOptions(count) => write!(f, "only {} distinct option(s)", count),
            RowSkip::UnresolvedCorrectAnswer(cell) => {
                write!(f, "correct answer {:?} matches no option", cell)
            }
        }
    }
}

fn cell(row: &[String], index: Option<usize>) -> &str {
    index
        .and_then(|index| row.get(index))
        .map(|value| value.trim())
        .unwrap_or("")
}

fn gather_options(row: &[String], roles: &RoleMap) -> Vec<String> {
    let combined = OPTION_SEPARATOR_REGEX
        .split(cell(row, roles.combined_options))
        .map(str::trim)
        .filter(|option| !option.is_empty());
    let discrete = roles
        .discrete_options()
        .map(|index| cell(row, Some(index)))
        .filter(|option| !option.is_empty());

    combined
        .chain(discrete)
        .unique_by(|option| option.to_lowercase())
        .map(str::to_owned)
        .collect()
}

fn letter_index(letter: &str) -> Option<usize> {
    letter
        .bytes()
        .next()
        .filter(|b| (b'a'..=b'f').contains(b))
        .map(|b| (b - b'a') as usize)
}

/// Maps a correct-answer cell onto one of the options.
///
/// A letter code (`B`, `b)`, `Option C`) wins over a 1-based number, which wins over
/// the literal option text. A cell that happens to contain a letter between `a` and
/// `f` is therefore read as a letter code even when it also spells an option.
pub fn resolve_correct_answer(cell: &str, options: &[String]) -> Option<String> {
    let normalized = cell.trim().to_lowercase();
    let option_at = |index: usize| options.get(index).cloned();

    let exact_letter = || {
        if normalized.len() == 1 {
            letter_index(&normalized).and_then(option_at)
        } else {
            None
        }
    };
    let embedded_letter = || {
        ANSWER_LETTER_REGEX
            .find(&normalized)
            .and_then(|m| letter_index(m.as_str()))
            .and_then(option_at)
    };
    let number = || {
        ANSWER_NUMBER_REGEX
            .find(&normalized)
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
            .and_then(option_at)
    };
    let text = || {
        options
            .iter()
            .find(|option| option.to_lowercase() == normalized)
            .cloned()
    };

    exact_letter()
        .or_else(embedded_letter)
        .or_else(number)
        .or_else(text)
}

fn split_media(cell: &str) -> Vec<String> {
    MEDIA_SEPARATOR_REGEX
        .split(cell)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
        .collect()
}

pub fn extract_question(row: &[String], roles: &RoleMap) -> Result<Question, RowSkip> {
    let question = cell(row, roles.question);
    if question.is_empty() {
        return Err(RowSkip::BlankQuestion);
    }

    let options = gather_options(row, roles);
    if options.len() < MIN_OPTIONS {
        return Err(RowSkip::TooFewOptions(options.len()));
    }

    let correct_cell = cell(row, roles.correct_answer);
    let correct_answer = resolve_correct_answer(correct_cell, &options)
        .ok_or_else(|| RowSkip::UnresolvedCorrectAnswer(correct_cell.to_owned()))?;

    Ok(Question {
        question: question.to_owned(),
        options,
        correct_answer,
        explanation: cell(row, roles.explanation).to_owned(),
        media: split_media(cell(row, roles.media)),
    })
}

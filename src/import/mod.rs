use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::quiz::{Question, Quiz, DEFAULT_QUIZ_TITLE};
use crate::store::folders::QuizStore;
use crate::store::KeyValueStore;

pub mod decode;
pub mod header;
pub mod row;
pub mod template;

#[cfg(test)]
mod tests;

pub use self::decode::DecodeError;
use self::header::RoleMap;
use self::row::RowSkip;

/// Rows of cells, as decoded from a spreadsheet. Rows may be ragged.
pub type CellGrid = Vec<Vec<String>>;

const NO_QUESTIONS_NOTE: &str = "No valid questions parsed. Verify header names and that each \
                                 row has a Question, at least 2 Options, and a CorrectAnswer.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Ok,
    Error,
}

/// What the importer saw during the last import attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDiagnostics {
    pub file_name: Option<String>,
    pub header_row_index: Option<usize>,
    pub headers: Vec<String>,
    pub rows_considered: Option<usize>,
    pub parsed_count: Option<usize>,
    pub status: ImportStatus,
    pub note: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Error processing file: {source}. Make sure it's a valid XLSX/CSV.")]
    Decode {
        source: DecodeError,
        diagnostics: ImportDiagnostics,
    },
    #[error(
        "No valid questions found in the file. Check headers (Question, OptionA/Option1.., \
         CorrectAnswer, Explanation, MediaURLs) and data format."
    )]
    NoQuestionsParsed(ImportDiagnostics),
}

impl ImportError {
    pub fn diagnostics(&self) -> &ImportDiagnostics {
        match self {
            ImportError::Decode { diagnostics, .. } => diagnostics,
            ImportError::NoQuestionsParsed(diagnostics) => diagnostics,
        }
    }

    fn with_file_name(mut self, file_name: &str) -> Self {
        let diagnostics = match &mut self {
            ImportError::Decode { diagnostics, .. } => diagnostics,
            ImportError::NoQuestionsParsed(diagnostics) => diagnostics,
        };
        diagnostics.file_name = Some(file_name.to_owned());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedSheet {
    pub questions: Vec<Question>,
    pub header_row_index: usize,
    pub headers: Vec<String>,
    pub rows_considered: usize,
}

impl ParsedSheet {
    pub fn diagnostics(&self, file_name: Option<&str>) -> ImportDiagnostics {
        ImportDiagnostics {
            file_name: file_name.map(str::to_owned),
            header_row_index: Some(self.header_row_index),
            headers: self.headers.clone(),
            rows_considered: Some(self.rows_considered),
            parsed_count: Some(self.questions.len()),
            status: ImportStatus::Ok,
            note: None,
            error: None,
        }
    }
}

/// Turns a loosely structured grid into quiz questions.
///
/// Rows that lack a question, have fewer than two distinct options, or whose correct
/// answer cannot be matched to an option are dropped. Only a sheet that yields no
/// question at all is an error.
pub fn parse(grid: &CellGrid) -> Result<ParsedSheet, ImportError> {
    let header_row_index = header::detect_header_row(grid);
    let headers: Vec<String> = grid
        .get(header_row_index)
        .map(|row| row.iter().map(|h| h.trim().to_owned()).collect())
        .unwrap_or_default();
    let roles = RoleMap::from_headers(&headers);
    debug!("Header row {} resolved to {:?}", header_row_index, roles);

    let mut questions = Vec::new();
    let mut rows_considered = 0;
    for (index, row) in grid.iter().enumerate().skip(header_row_index + 1) {
        match row::extract_question(row, &roles) {
            Ok(question) => {
                rows_considered += 1;
                questions.push(question);
            }
            Err(RowSkip::BlankQuestion) => (),
            Err(reason) => {
                rows_considered += 1;
                debug!("Skipping row {}: {}", index + 1, reason);
            }
        }
    }

    if questions.is_empty() {
        return Err(ImportError::NoQuestionsParsed(ImportDiagnostics {
            file_name: None,
            header_row_index: Some(header_row_index),
            headers,
            rows_considered: Some(rows_considered),
            parsed_count: Some(0),
            status: ImportStatus::Error,
            note: Some(NO_QUESTIONS_NOTE.to_owned()),
            error: None,
        }));
    }

    Ok(ParsedSheet {
        questions,
        header_row_index,
        headers,
        rows_considered,
    })
}

/// Default quiz title for an uploaded file: its name without the last extension.
/// A name without any extension gets the generic title.
pub fn suggested_title(file_name: &str) -> String {
    let base_name = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file_name);
    let stem = base_name
        .rsplit_once('.')
        .map_or("", |(stem, _extension)| stem.trim());
    if stem.is_empty() {
        DEFAULT_QUIZ_TITLE.to_owned()
    } else {
        stem.to_owned()
    }
}

/// A parsed import awaiting the admin's decision.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingImport {
    pub file_name: String,
    pub questions: Vec<Question>,
}

impl PendingImport {
    pub fn suggested_title(&self) -> String {
        suggested_title(&self.file_name)
    }

    /// Saves the questions as a new quiz. A blank title falls back to the file name.
    pub fn confirm<S: KeyValueStore>(
        self,
        quizzes: &QuizStore<S>,
        folder_id: &str,
        title: Option<&str>,
    ) -> anyhow::Result<Quiz> {
        let title = match title.map(str::trim) {
            Some(title) if !title.is_empty() => title.to_owned(),
            _ => self.suggested_title(),
        };
        let quiz = Quiz::new(&title, self.questions);
        quizzes
            .save(folder_id, quiz.clone())
            .with_context(|| format!("Could not save imported quiz {:?}", title))?;
        info!(
            "Imported {} question(s) from {} as {:?}",
            quiz.questions.len(),
            self.file_name,
            quiz.title
        );
        Ok(quiz)
    }

    pub fn discard(self) {
        info!("Discarded pending import of {}", self.file_name);
    }
}

/// Outcome of a successful file import.
#[derive(Clone, Debug)]
pub struct ImportReport {
    pub pending: PendingImport,
    pub diagnostics: ImportDiagnostics,
}

pub fn import_file(path: &Path) -> Result<ImportReport, ImportError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    let grid = decode::decode_file(path).map_err(|source| {
        warn!("Could not decode {:?}: {}", path, source);
        ImportError::Decode {
            diagnostics: ImportDiagnostics {
                file_name: Some(file_name.clone()),
                header_row_index: None,
                headers: Vec::new(),
                rows_considered: None,
                parsed_count: None,
                status: ImportStatus::Error,
                note: None,
                error: Some(source.to_string()),
            },
            source,
        }
    })?;

    let sheet = parse(&grid).map_err(|e| e.with_file_name(&file_name))?;
    let diagnostics = sheet.diagnostics(Some(&file_name));
    Ok(ImportReport {
        pending: PendingImport {
            file_name,
            questions: sheet.questions,
        },
        diagnostics,
    })
}

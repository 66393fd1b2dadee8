use calamine::{open_workbook_auto, Data, Reader};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use super::CellGrid;

const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Workbook(#[from] calamine::Error),
    #[error("the workbook does not contain any worksheets")]
    NoWorksheet,
    #[error("unsupported file type {0:?}, expected .xlsx, .xls, .ods or .csv")]
    UnsupportedFormat(String),
}

enum SheetFormat {
    Delimited,
    Workbook,
}

fn sheet_format(path: &Path) -> Result<SheetFormat, DecodeError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "csv" | "txt" => Ok(SheetFormat::Delimited),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SheetFormat::Workbook),
        _ => Err(DecodeError::UnsupportedFormat(extension)),
    }
}

pub fn decode_file(path: &Path) -> Result<CellGrid, DecodeError> {
    let grid = match sheet_format(path)? {
        SheetFormat::Delimited => decode_csv(File::open(path).map_err(csv::Error::from)?)?,
        SheetFormat::Workbook => decode_workbook(path)?,
    };
    debug!("Decoded {} row(s) from {:?}", grid.len(), path);
    Ok(grid)
}

pub fn decode_csv<R: Read>(source: R) -> Result<CellGrid, DecodeError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);
    read_records(reader)
}

fn read_records<R: Read>(mut reader: csv::Reader<R>) -> Result<CellGrid, DecodeError> {
    let mut grid = CellGrid::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(str::to_owned).collect());
    }
    if let Some(first_cell) = grid.first_mut().and_then(|row| row.first_mut()) {
        if first_cell.starts_with(UTF8_BOM) {
            *first_cell = first_cell.trim_start_matches(UTF8_BOM).to_owned();
        }
    }
    Ok(grid)
}

/// Reads the first worksheet of a workbook.
fn decode_workbook(path: &Path) -> Result<CellGrid, DecodeError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(DecodeError::NoWorksheet)?;
    let range = workbook.worksheet_range(&sheet_name)?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(render_cell).collect())
        .collect())
}

fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Data::Float(n) => n.to_string(),
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_owned(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::Error(e) => format!("#{:?}", e),
    }
}

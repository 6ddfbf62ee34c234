//! Worksheet I/O for the database workbook.

use crate::errors::LedgerError;
use crate::fields::HeaderSpec;
use crate::styles;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use umya_spreadsheet::{Spreadsheet, Worksheet};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }

    /// Canonical string form used for comparisons. Integral numbers render
    /// without a fraction, the same way a saved number reads back.
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text.clone(),
            Self::Number(number) => format_number(*number),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            Self::Number(_) => false,
        }
    }
}

pub fn format_number(number: f64) -> String {
    if number == 0.0 {
        return "0".to_string();
    }
    format!("{number}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenOutcome {
    Created,
    Opened,
    HeadersWritten,
    HeaderMismatch,
    RecoveredFromUnreadable,
}

/// Opens the database workbook at `path`, or starts a new one.
///
/// An unreadable file is not fatal: the error is logged and a fresh workbook
/// takes its place, to be written over the old file on save.
pub fn open_or_create(
    path: &Path,
    headers: &[HeaderSpec],
    sheet_name: &str,
) -> (Spreadsheet, OpenOutcome) {
    if !path.exists() {
        tracing::info!(path = %path.display(), "creating new database workbook");
        return (create_new(headers, sheet_name), OpenOutcome::Created);
    }

    let mut book = match umya_spreadsheet::reader::xlsx::read(path) {
        Ok(book) => book,
        Err(err) => {
            tracing::error!(
                path = %path.display(),
                error = %err,
                "failed to read existing workbook; starting a new one"
            );
            return (
                create_new(headers, sheet_name),
                OpenOutcome::RecoveredFromUnreadable,
            );
        }
    };

    let Some(sheet) = book.get_sheet_mut(&0) else {
        tracing::error!(path = %path.display(), "workbook has no worksheets; starting a new one");
        return (
            create_new(headers, sheet_name),
            OpenOutcome::RecoveredFromUnreadable,
        );
    };

    let existing = read_header_titles(sheet);
    if existing.iter().all(|title| title.is_empty()) {
        write_headers(sheet, headers);
        return (book, OpenOutcome::HeadersWritten);
    }

    let expected: Vec<&str> = headers.iter().map(|h| h.title.as_str()).collect();
    let matches = existing.len() == expected.len()
        && existing
            .iter()
            .zip(expected.iter())
            .all(|(have, want)| have.trim() == *want);
    if !matches {
        tracing::warn!(
            path = %path.display(),
            existing = ?existing,
            expected = ?expected,
            "worksheet headers differ from the current field layout"
        );
        return (book, OpenOutcome::HeaderMismatch);
    }

    (book, OpenOutcome::Opened)
}

/// A new workbook whose first sheet is renamed and carries the styled header row.
pub fn create_new(headers: &[HeaderSpec], sheet_name: &str) -> Spreadsheet {
    let mut book = umya_spreadsheet::new_file();
    if let Some(sheet) = book.get_sheet_mut(&0) {
        sheet.set_name(sheet_name);
        write_headers(sheet, headers);
    }
    book
}

pub fn write_headers(sheet: &mut Worksheet, headers: &[HeaderSpec]) {
    for (idx, header) in headers.iter().enumerate() {
        let col = idx as u32 + 1;
        sheet
            .get_cell_mut((col, 1))
            .set_value_string(header.title.clone());
    }
    styles::style_header_row(sheet, headers);
}

/// Titles of row 1 up to the last used column.
pub fn read_header_titles(sheet: &Worksheet) -> Vec<String> {
    let width = sheet.get_highest_column();
    let mut titles: Vec<String> = (1..=width).map(|col| cell_text(sheet, col, 1)).collect();
    while titles.last().is_some_and(|title| title.trim().is_empty()) {
        titles.pop();
    }
    titles
}

pub fn cell_text(sheet: &Worksheet, col: u32, row: u32) -> String {
    sheet
        .get_cell((col, row))
        .map(|cell| cell.get_value().to_string())
        .unwrap_or_default()
}

pub fn read_row(sheet: &Worksheet, row: u32, width: usize) -> Vec<String> {
    (1..=width as u32).map(|col| cell_text(sheet, col, row)).collect()
}

pub fn write_cell(sheet: &mut Worksheet, col: u32, row: u32, value: &CellValue) {
    let cell = sheet.get_cell_mut((col, row));
    match value {
        CellValue::Empty => {
            cell.set_value_string(String::new());
        }
        CellValue::Text(text) => {
            cell.set_value_string(text.clone());
        }
        CellValue::Number(number) => {
            cell.set_value_number(*number);
        }
    }
}

/// Writes `values` below the last used row and returns the new row index.
pub fn append_row(sheet: &mut Worksheet, values: &[CellValue]) -> u32 {
    let row = sheet.get_highest_row().max(1) + 1;
    for (idx, value) in values.iter().enumerate() {
        write_cell(sheet, idx as u32 + 1, row, value);
    }
    tracing::debug!(row, columns = values.len(), "appended row");
    row
}

/// Rewrites every column of `row`, blanks included.
pub fn overwrite_row(sheet: &mut Worksheet, row: u32, values: &[CellValue], headers: &[HeaderSpec]) {
    for (idx, value) in values.iter().enumerate() {
        let col = idx as u32 + 1;
        let previous = cell_text(sheet, col, row);
        let next = value.display();
        if previous != next {
            let column = headers
                .get(idx)
                .map(|h| h.title.as_str())
                .unwrap_or_default();
            tracing::debug!(row, column, previous = %previous, next = %next, "cell updated");
        }
        write_cell(sheet, col, row, value);
    }
}

pub fn data_row_count(sheet: &Worksheet) -> u32 {
    sheet.get_highest_row().saturating_sub(1)
}

/// Saves `book` to `path` through a temporary file in the same directory, so
/// a failed write leaves the previous file in place.
pub fn save(book: &Spreadsheet, path: &Path) -> Result<()> {
    let target = path.display().to_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create output directory {:?}", dir))
            .map_err(|err| LedgerError::workbook_save(&target, format!("{err:#}")))?;
    }

    let staged = tempfile::Builder::new()
        .prefix(".contract-ledger-")
        .suffix(".xlsx")
        .tempfile_in(&dir)
        .map_err(|err| LedgerError::workbook_save(&target, err))?;

    umya_spreadsheet::writer::xlsx::write(book, staged.path())
        .map_err(|err| LedgerError::workbook_save(&target, err))?;
    staged
        .persist(path)
        .map_err(|err| LedgerError::workbook_save(&target, err.error))?;

    tracing::info!(path = %target, "workbook saved");
    Ok(())
}

/// Reads the database workbook for inspection.
pub fn open_existing(path: &Path) -> Result<Spreadsheet> {
    if !path.exists() {
        anyhow::bail!("workbook {:?} does not exist", path);
    }
    let book = umya_spreadsheet::reader::xlsx::read(path)
        .map_err(|err| LedgerError::workbook_open(path.display().to_string(), err))?;
    Ok(book)
}

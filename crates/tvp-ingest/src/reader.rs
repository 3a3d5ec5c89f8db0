//! Raw delimited-text reading: header and cell cleanup only, no typing.

use std::collections::BTreeSet;
use std::io::Read;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};

/// Header plus untyped cells; blank cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Cells of one column in row order.
    pub fn column(&self, idx: usize) -> Vec<Option<String>> {
        self.rows
            .iter()
            .map(|row| row.get(idx).cloned().flatten())
            .collect()
    }
}

fn normalize_header(raw: &str, idx: usize) -> String {
    let cleaned = raw.trim_matches('\u{feff}').replace('"', "");
    let mut parts = cleaned.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    if normalized.is_empty() {
        format!("Unnamed_{idx}")
    } else {
        normalized
    }
}

fn normalize_cell(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_matches('"').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Reads delimited text with a header row.
///
/// Short rows are padded with blanks, long rows truncated to the header
/// width, and rows with no content skipped.
pub fn read_raw_csv<R: Read>(input: R) -> Result<RawTable> {
    read_raw(input, false)
}

/// Like [`read_raw_csv`] but without header or cell cleanup: only empty
/// cells become `None`, and rows of empty cells are kept.
pub fn read_raw_csv_verbatim<R: Read>(input: R) -> Result<RawTable> {
    read_raw(input, true)
}

fn verbatim_cell(raw: &str) -> Option<String> {
    (!raw.is_empty()).then(|| raw.to_string())
}

fn read_raw<R: Read>(input: R, verbatim: bool) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    let mut records = reader.records();
    let header_record = loop {
        match records.next() {
            None => return Err(IngestError::EmptyCsv),
            Some(record) => {
                let record = record?;
                if record.iter().any(|cell| !cell.trim().is_empty()) {
                    break record;
                }
            }
        }
    };
    let headers: Vec<String> = header_record
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            if verbatim && !cell.is_empty() {
                cell.to_string()
            } else {
                normalize_header(cell, idx)
            }
        })
        .collect();
    let mut seen = BTreeSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(IngestError::DuplicateHeader {
                column: header.clone(),
            });
        }
    }

    let clean: fn(&str) -> Option<String> = if verbatim {
        verbatim_cell
    } else {
        normalize_cell
    };
    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        let row: Vec<Option<String>> = (0..headers.len())
            .map(|idx| record.get(idx).and_then(clean))
            .collect();
        if !verbatim && row.iter().all(Option::is_none) {
            continue;
        }
        rows.push(row);
    }
    Ok(RawTable { headers, rows })
}

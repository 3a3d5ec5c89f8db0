//! Error types for dataset ingestion.

use std::path::PathBuf;
use thiserror::Error;
use tvp_model::AnalysisError;

/// Errors that can occur while loading a dataset.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    /// Malformed delimited text.
    #[error("failed to parse CSV: {message}")]
    CsvParse { message: String },

    /// Source has no header row.
    #[error("CSV input is empty")]
    EmptyCsv,

    /// Two header cells normalize to the same name.
    #[error("duplicate column '{column}' in header")]
    DuplicateHeader { column: String },

    // === Schema Errors ===
    /// A declared column type names a column the header lacks.
    #[error("declared column '{column}' not found in header")]
    DeclaredColumnMissing { column: String },

    // === Table Errors ===
    /// Failed to assemble the typed table.
    #[error(transparent)]
    Table(#[from] AnalysisError),
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::CsvParse {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/violations.csv"),
        };
        assert_eq!(err.to_string(), "CSV file not found: /data/violations.csv");
    }

    #[test]
    fn test_error_from_analysis() {
        let err: IngestError = AnalysisError::schema("Date").into();
        assert!(matches!(err, IngestError::Table(_)));
        assert_eq!(err.to_string(), "column not found: Date");
    }
}

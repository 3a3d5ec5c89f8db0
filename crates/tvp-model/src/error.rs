//! Error types for analysis requests.
//!
//! Every variant aborts only the computation that raised it; callers catch
//! these at the request boundary and keep the session alive.

use chrono::NaiveDate;
use thiserror::Error;

use crate::value::ColumnType;

/// Errors raised by table operations, the aggregation engine and its
/// collaborators.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnalysisError {
    /// Referenced column is absent from the table schema.
    #[error("column not found: {column}")]
    Schema {
        /// The column name that was not found.
        column: String,
    },

    /// An operation needs a column of a different type.
    #[error("column '{column}' is {found}, expected {expected}")]
    TypeMismatch {
        /// The offending column.
        column: String,
        /// Type the operation requires.
        expected: ColumnType,
        /// Type declared in the schema.
        found: ColumnType,
    },

    /// Two source rows map to the same output slot.
    #[error("duplicate entry {key} in {context}")]
    DuplicateEntry {
        /// Rendered key of the collision.
        key: String,
        /// Operation and columns involved.
        context: String,
    },

    /// Date range whose start is after its end.
    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// Requested first day.
        start: NaiveDate,
        /// Requested last day.
        end: NaiveDate,
    },

    /// A request parameter is malformed.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },

    /// DataFrame column whose dtype has no table column type.
    #[error("column '{column}' has unsupported dtype {dtype}")]
    UnsupportedType {
        /// Column name.
        column: String,
        /// Rendered Polars dtype.
        dtype: String,
    },

    /// Polars DataFrame operation error.
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    /// Shorthand for a missing column.
    pub fn schema(column: impl Into<String>) -> Self {
        Self::Schema {
            column: column.into(),
        }
    }

    /// Shorthand for a malformed request.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Check if the caller can fix the request and retry.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Polars(_))
    }

    /// Get a user-friendly suggestion for fixing this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Schema { .. } => Some("Check the column name against the dataset header."),
            Self::TypeMismatch { .. } => {
                Some("Pick a numeric column or declare the column type when loading.")
            }
            Self::DuplicateEntry { .. } => {
                Some("Aggregate the data first (for example with a pivot table).")
            }
            Self::InvalidDateRange { .. } => Some("Swap the start and end dates."),
            Self::UnsupportedType { .. } => {
                Some("Cast the column to text, number, boolean or datetime.")
            }
            _ => None,
        }
    }
}

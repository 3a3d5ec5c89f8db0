use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tvp_model::ColumnType;

/// Share of non-blank values that must coerce for a column to be inferred
/// as numeric or datetime.
pub const DEFAULT_NUMERIC_THRESHOLD: f64 = 0.9;

/// Loader settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Column types that bypass inference.
    pub declared: BTreeMap<String, ColumnType>,
    /// Inference threshold for numeric and datetime columns.
    pub numeric_threshold: f64,
    /// Fail when a declared column is missing from the header.
    pub strict_declarations: bool,
    /// Keep header names and cells exactly as written. Used when reloading
    /// exported results; source files want the default cleanup.
    pub verbatim: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            declared: BTreeMap::new(),
            numeric_threshold: DEFAULT_NUMERIC_THRESHOLD,
            strict_declarations: true,
            verbatim: false,
        }
    }
}

impl IngestOptions {
    /// Declare a column type, overriding inference.
    #[must_use]
    pub fn declare(mut self, column: impl Into<String>, ty: ColumnType) -> Self {
        self.declared.insert(column.into(), ty);
        self
    }

    #[must_use]
    pub fn verbatim(mut self) -> Self {
        self.verbatim = true;
        self
    }

    #[must_use]
    pub fn with_numeric_threshold(mut self, threshold: f64) -> Self {
        self.numeric_threshold = threshold;
        self
    }
}

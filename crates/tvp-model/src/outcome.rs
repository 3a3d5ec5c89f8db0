//! Non-fatal signals returned alongside results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::ColumnType;

/// A condition worth reporting that does not abort the computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Non-blank cells that could not be coerced and were set to null.
    CoercionFailed {
        column: String,
        target: ColumnType,
        failed: usize,
        /// Up to five raw values that failed.
        samples: Vec<String>,
    },
    /// Date or time values that could not be parsed for bucketing.
    UnparsedDates { column: String, count: usize },
    /// A filter or computation produced zero rows.
    EmptyResult { stage: String },
}

impl Warning {
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::CoercionFailed { column, .. } | Self::UnparsedDates { column, .. } => {
                Some(column)
            }
            Self::EmptyResult { .. } => None,
        }
    }

    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult { .. })
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoercionFailed {
                column,
                target,
                failed,
                samples,
            } => {
                write!(f, "{failed} value(s) in '{column}' could not be read as {target}")?;
                if !samples.is_empty() {
                    write!(f, " (examples: {})", samples.join(", "))?;
                }
                Ok(())
            }
            Self::UnparsedDates { column, count } => {
                write!(f, "{count} value(s) in '{column}' are not valid dates and were left out")
            }
            Self::EmptyResult { stage } => write!(f, "no rows to show after {stage}"),
        }
    }
}

/// A result plus the warnings produced while computing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Outcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    pub fn into_parts(self) -> (T, Vec<Warning>) {
        (self.value, self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_warning_lists_samples() {
        let warning = Warning::CoercionFailed {
            column: "Fine_Amount".to_string(),
            target: ColumnType::Number,
            failed: 2,
            samples: vec!["abc".to_string(), "n/a".to_string()],
        };
        assert_eq!(
            warning.to_string(),
            "2 value(s) in 'Fine_Amount' could not be read as number (examples: abc, n/a)"
        );
        assert_eq!(warning.column(), Some("Fine_Amount"));
    }

    #[test]
    fn warnings_serialize_with_kind_tag() {
        let warning = Warning::EmptyResult {
            stage: "filter".to_string(),
        };
        let json = serde_json::to_string(&warning).unwrap();
        assert_eq!(json, r#"{"kind":"empty_result","stage":"filter"}"#);
    }

    #[test]
    fn outcome_map_keeps_warnings() {
        let outcome = Outcome::with_warnings(
            2,
            vec![Warning::UnparsedDates {
                column: "Date".to_string(),
                count: 1,
            }],
        )
        .map(|v| v * 10);
        assert_eq!(outcome.value, 20);
        assert_eq!(outcome.warnings.len(), 1);
    }
}

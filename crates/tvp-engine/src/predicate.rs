//! Row predicates, configurable from requests and compiled to Polars
//! expressions against a table's schema.
//!
//! Comparisons involving a null cell evaluate to false, so `Not` of a leaf
//! holds for null cells. A predicate and its negation therefore partition
//! every group exhaustively.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tvp_model::{AnalysisError, ColumnType, Result, Table, Value};

/// Numeric comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl CompareOp {
    fn apply(self, left: Expr, right: Expr) -> Expr {
        match self {
            Self::Gt => left.gt(right),
            Self::Ge => left.gt_eq(right),
            Self::Lt => left.lt(right),
            Self::Le => left.lt_eq(right),
            Self::Eq => left.eq(right),
            Self::Ne => left.neq(right),
        }
    }
}

/// A boolean condition over one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Cell equals `value`; text matches ignore case.
    Equals { column: String, value: Value },
    /// Cell equals any of `values`.
    OneOf { column: String, values: Vec<Value> },
    /// Numeric cell compared with a constant.
    Compare {
        column: String,
        cmp: CompareOp,
        value: f64,
    },
    /// Two numeric cells of the same row compared.
    CompareColumns {
        left: String,
        cmp: CompareOp,
        right: String,
    },
    /// Numeric cell within `[min, max]`.
    Between { column: String, min: f64, max: f64 },
    IsNull { column: String },
    Not { predicate: Box<Predicate> },
    All { predicates: Vec<Predicate> },
    Any { predicates: Vec<Predicate> },
}

impl Predicate {
    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn one_of<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::OneOf {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn compare(column: impl Into<String>, cmp: CompareOp, value: f64) -> Self {
        Self::Compare {
            column: column.into(),
            cmp,
            value,
        }
    }

    pub fn compare_columns(left: impl Into<String>, cmp: CompareOp, right: impl Into<String>) -> Self {
        Self::CompareColumns {
            left: left.into(),
            cmp,
            right: right.into(),
        }
    }

    pub fn negate(self) -> Self {
        Self::Not {
            predicate: Box::new(self),
        }
    }

    /// Columns referenced anywhere in the predicate.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Equals { column, .. }
            | Self::OneOf { column, .. }
            | Self::Compare { column, .. }
            | Self::Between { column, .. }
            | Self::IsNull { column } => vec![column.as_str()],
            Self::CompareColumns { left, right, .. } => vec![left.as_str(), right.as_str()],
            Self::Not { predicate } => predicate.columns(),
            Self::All { predicates } | Self::Any { predicates } => {
                predicates.iter().flat_map(Predicate::columns).collect()
            }
        }
    }

    /// Compiles into a non-null boolean expression over `table`'s columns.
    pub fn compile(&self, table: &Table) -> Result<Expr> {
        let expr = match self {
            Self::Equals { column, value } => {
                equals_expr(table, column, value)?.fill_null(lit(false))
            }
            Self::OneOf { column, values } => {
                let mut combined = lit(false);
                for value in values {
                    combined = combined.or(equals_expr(table, column, value)?.fill_null(lit(false)));
                }
                table.column_type(column)?;
                combined
            }
            Self::Compare { column, cmp, value } => {
                table.require_numeric(column)?;
                cmp.apply(numeric(column), lit(*value)).fill_null(lit(false))
            }
            Self::CompareColumns { left, cmp, right } => {
                table.require_numeric(left)?;
                table.require_numeric(right)?;
                cmp.apply(numeric(left), numeric(right))
                    .fill_null(lit(false))
            }
            Self::Between { column, min, max } => {
                table.require_numeric(column)?;
                numeric(column)
                    .gt_eq(lit(*min))
                    .and(numeric(column).lt_eq(lit(*max)))
                    .fill_null(lit(false))
            }
            Self::IsNull { column } => {
                table.column_type(column)?;
                col(column.as_str()).is_null()
            }
            Self::Not { predicate } => predicate.compile(table)?.not(),
            Self::All { predicates } => {
                let mut combined = lit(true);
                for predicate in predicates {
                    combined = combined.and(predicate.compile(table)?);
                }
                combined
            }
            Self::Any { predicates } => {
                let mut combined = lit(false);
                for predicate in predicates {
                    combined = combined.or(predicate.compile(table)?);
                }
                combined
            }
        };
        Ok(expr)
    }

    /// Evaluates the predicate row by row.
    pub fn mask(&self, table: &Table) -> Result<Vec<bool>> {
        let expr = self.compile(table)?;
        let frame = table
            .frame()
            .clone()
            .lazy()
            .select([expr.alias("__mask")])
            .collect()?;
        let column = frame.column("__mask")?;
        let values = column.bool()?;
        let mut mask: Vec<bool> = values
            .into_iter()
            .map(|value| value.unwrap_or(false))
            .collect();
        // A literal-only predicate collapses to a single row.
        if mask.len() == 1 && table.height() != 1 {
            mask = vec![mask[0]; table.height()];
        }
        Ok(mask)
    }
}

fn numeric(column: &str) -> Expr {
    col(column).cast(DataType::Float64)
}

fn equals_expr(table: &Table, column: &str, value: &Value) -> Result<Expr> {
    let ty = table.column_type(column)?;
    if value.is_null() {
        return Ok(col(column).is_null());
    }
    let label = value.label();
    let mismatch = || {
        AnalysisError::invalid_request(format!(
            "value '{label}' cannot be compared with {ty} column '{column}'"
        ))
    };
    let coerced = Value::parse_as(&label, ty).ok_or_else(mismatch)?;
    let expr = match (ty, coerced) {
        (ColumnType::Text, _) => col(column)
            .str()
            .to_lowercase()
            .eq(lit(label.trim().to_lowercase())),
        (ColumnType::Number, Value::Number(number)) => numeric(column).eq(lit(number)),
        (ColumnType::Boolean, Value::Boolean(flag)) => col(column).eq(lit(flag)),
        (ColumnType::DateTime, Value::DateTime(when)) => col(column)
            .cast(ColumnType::DateTime.dtype())
            .cast(DataType::Int64)
            .eq(lit(when.and_utc().timestamp_millis())),
        _ => return Err(mismatch()),
    };
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvp_model::ColumnData;

    fn sample() -> Table {
        Table::from_columns(vec![
            ColumnData::new(
                "Helmet_Worn",
                ColumnType::Text,
                vec!["Yes".into(), "no".into(), Value::Null, "YES".into()],
            ),
            ColumnData::new(
                "Recorded_Speed",
                ColumnType::Number,
                vec![80.0.into(), 45.0.into(), 120.0.into(), Value::Null],
            ),
            ColumnData::new(
                "Speed_Limit",
                ColumnType::Number,
                vec![60.0.into(), 50.0.into(), 100.0.into(), 40.0.into()],
            ),
            ColumnData::new(
                "Fine_Paid",
                ColumnType::Boolean,
                vec![true.into(), false.into(), true.into(), Value::Null],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn equals_ignores_case_for_text() {
        let mask = Predicate::equals("Helmet_Worn", "yes").mask(&sample()).unwrap();
        assert_eq!(mask, vec![true, false, false, true]);
    }

    #[test]
    fn negation_covers_null_cells() {
        let mask = Predicate::equals("Helmet_Worn", "yes")
            .negate()
            .mask(&sample())
            .unwrap();
        assert_eq!(mask, vec![false, true, true, false]);
    }

    #[test]
    fn boolean_columns_accept_word_literals() {
        let mask = Predicate::equals("Fine_Paid", "Yes").mask(&sample()).unwrap();
        assert_eq!(mask, vec![true, false, true, false]);
    }

    #[test]
    fn compare_columns_for_over_speeding() {
        let predicate = Predicate::compare_columns("Recorded_Speed", CompareOp::Gt, "Speed_Limit");
        assert_eq!(predicate.mask(&sample()).unwrap(), vec![true, false, true, false]);
    }

    #[test]
    fn between_is_inclusive() {
        let predicate = Predicate::Between {
            column: "Recorded_Speed".to_string(),
            min: 45.0,
            max: 80.0,
        };
        assert_eq!(predicate.mask(&sample()).unwrap(), vec![true, true, false, false]);
    }

    #[test]
    fn one_of_and_combinators() {
        let predicate = Predicate::All {
            predicates: vec![
                Predicate::one_of("Helmet_Worn", ["yes", "no"]),
                Predicate::compare("Recorded_Speed", CompareOp::Ge, 50.0),
            ],
        };
        assert_eq!(predicate.mask(&sample()).unwrap(), vec![true, false, false, false]);
        assert_eq!(predicate.columns(), vec!["Helmet_Worn", "Recorded_Speed"]);
    }

    #[test]
    fn unknown_column_is_schema_error() {
        let err = Predicate::equals("Weather", "Fog").compile(&sample()).unwrap_err();
        assert!(matches!(err, AnalysisError::Schema { .. }));
    }

    #[test]
    fn numeric_compare_on_text_is_type_mismatch() {
        let err = Predicate::compare("Helmet_Worn", CompareOp::Gt, 1.0)
            .compile(&sample())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::TypeMismatch { .. }));
    }

    #[test]
    fn deserializes_from_json() {
        let predicate: Predicate = serde_json::from_str(
            r#"{"op": "one_of", "column": "Weather_Condition", "values": ["Fog", "Rain"]}"#,
        )
        .unwrap();
        assert_eq!(predicate, Predicate::one_of("Weather_Condition", ["Fog", "Rain"]));
    }
}

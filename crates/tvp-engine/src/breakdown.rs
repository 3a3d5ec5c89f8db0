//! Share of flagged records per category.

use polars::prelude::*;
use tracing::debug;
use tvp_model::{AnalysisError, ColumnData, ColumnType, Matrix, Result, Table, Value};

use crate::pivot::{axis_labels, percent, positions};
use crate::predicate::Predicate;

pub const TOTAL_COLUMN: &str = "total";
pub const FLAGGED_COLUMN: &str = "count";
pub const PERCENT_COLUMN: &str = "percent";

const FLAG_MASK: &str = "__flagged";

/// Per distinct value of `group_col`: total records, records satisfying
/// `flag`, and their percentage of the group total.
///
/// Groups appear in first-appearance order; null keys are excluded. A zero
/// denominator yields 0%.
pub fn percentage_breakdown(table: &Table, group_col: &str, flag: &Predicate) -> Result<Table> {
    table.column_type(group_col)?;
    let mask = flag.mask(table)?;
    let marked = table.with_column(&ColumnData::new(
        FLAG_MASK,
        ColumnType::Boolean,
        mask.into_iter().map(Value::Boolean).collect(),
    ))?;
    let grouped = marked
        .frame()
        .clone()
        .lazy()
        .filter(col(group_col).is_not_null())
        .group_by_stable([col(group_col)])
        .agg([
            len().cast(DataType::Int64).alias(TOTAL_COLUMN),
            col(FLAG_MASK).cast(DataType::Int64).sum().alias(FLAGGED_COLUMN),
        ])
        .collect()?;
    let result = Table::new(grouped)?;
    let totals = result.numbers(TOTAL_COLUMN)?;
    let counts = result.numbers(FLAGGED_COLUMN)?;
    let percents = totals
        .iter()
        .zip(&counts)
        .map(|(total, count)| {
            Value::Number(percent(count.unwrap_or(0.0), total.unwrap_or(0.0)))
        })
        .collect();
    let result = result.with_column(&ColumnData::new(PERCENT_COLUMN, ColumnType::Number, percents))?;
    debug!(groups = result.height(), "percentage breakdown");
    Ok(result)
}

/// Cell-wise flag statistics for a two-key categorical heatmap.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentageMatrix {
    /// Records per cell.
    pub totals: Matrix,
    /// Records satisfying the flag per cell.
    pub flagged: Matrix,
    /// `flagged / totals` as a percentage; 0 for empty cells.
    pub percent: Matrix,
}

/// Flag percentages for every (`index`, `columns`) combination.
pub fn percentage_matrix(
    table: &Table,
    index: &str,
    columns: &str,
    flag: &Predicate,
) -> Result<PercentageMatrix> {
    table.require_columns(&[index, columns])?;
    if index == columns {
        return Err(AnalysisError::invalid_request(
            "heatmap index and columns must be different columns",
        ));
    }
    let mask = flag.mask(table)?;
    let index_values = table.values(index)?;
    let column_values = table.values(columns)?;
    let row_labels = axis_labels(&index_values);
    let column_labels = axis_labels(&column_values);
    let row_at = positions(&row_labels);
    let col_at = positions(&column_labels);

    let zero = Value::Number(0.0);
    let blank = |name: &str| {
        Matrix::filled(
            index,
            columns,
            name,
            row_labels.clone(),
            column_labels.clone(),
            &zero,
        )
    };
    let mut totals = blank(TOTAL_COLUMN);
    let mut flagged = blank(FLAGGED_COLUMN);
    let mut percents = blank(PERCENT_COLUMN);

    let mut counts = vec![vec![(0usize, 0usize); column_labels.len()]; row_labels.len()];
    for ((row_key, col_key), hit) in index_values.iter().zip(&column_values).zip(mask) {
        if row_key.is_null() || col_key.is_null() {
            continue;
        }
        let (Some(&row), Some(&col)) = (row_at.get(&row_key.label()), col_at.get(&col_key.label()))
        else {
            continue;
        };
        counts[row][col].0 += 1;
        if hit {
            counts[row][col].1 += 1;
        }
    }
    for (row, row_counts) in counts.iter().enumerate() {
        for (col, &(total, hits)) in row_counts.iter().enumerate() {
            if total == 0 {
                continue;
            }
            totals.set(row, col, Value::Number(total as f64));
            flagged.set(row, col, Value::Number(hits as f64));
            percents.set(row, col, Value::Number(percent(hits as f64, total as f64)));
        }
    }
    Ok(PercentageMatrix {
        totals,
        flagged,
        percent: percents,
    })
}

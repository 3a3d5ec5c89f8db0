//! Reshaping grouped data into row x column matrices.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use tvp_model::{AnalysisError, Matrix, Result, Table, Value};

use crate::aggregate::{AggFunc, COUNT_COLUMN, group_aggregate};

/// Percentage normalization applied to a crosstab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalize {
    /// Raw counts.
    #[default]
    None,
    /// Each row as percentages of its row total.
    Index,
    /// Each column as percentages of its column total.
    Columns,
}

/// Distinct non-null labels, sorted.
pub(crate) fn axis_labels(values: &[Value]) -> Vec<Value> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut labels = Vec::new();
    for value in values {
        if value.is_null() {
            continue;
        }
        if seen.insert(value.label()) {
            labels.push(value.clone());
        }
    }
    labels.sort_by(Value::total_cmp);
    labels
}

pub(crate) fn positions(labels: &[Value]) -> HashMap<String, usize> {
    labels
        .iter()
        .enumerate()
        .map(|(idx, label)| (label.label(), idx))
        .collect()
}

/// Pivots `values` into a matrix of `index` rows by `columns` columns.
///
/// Axis labels are the sorted distinct non-null keys. Each cell holds the
/// single matching value; a second row for the same key pair is a
/// [`AnalysisError::DuplicateEntry`]. Combinations with no row hold `fill`
/// and are marked unobserved.
pub fn pivot(table: &Table, index: &str, columns: &str, values: &str, fill: &Value) -> Result<Matrix> {
    table.require_columns(&[index, columns, values])?;
    if index == columns {
        return Err(AnalysisError::invalid_request(
            "pivot index and columns must be different columns",
        ));
    }
    let index_values = table.values(index)?;
    let column_values = table.values(columns)?;
    let cell_values = table.values(values)?;

    let mut matrix = Matrix::filled(
        index,
        columns,
        values,
        axis_labels(&index_values),
        axis_labels(&column_values),
        fill,
    );
    let row_at = positions(&matrix.row_labels);
    let col_at = positions(&matrix.column_labels);

    for ((row_key, col_key), value) in index_values.iter().zip(&column_values).zip(cell_values) {
        if row_key.is_null() || col_key.is_null() {
            continue;
        }
        let (Some(&row), Some(&col)) = (row_at.get(&row_key.label()), col_at.get(&col_key.label()))
        else {
            continue;
        };
        if matrix.observed[row][col] {
            return Err(AnalysisError::DuplicateEntry {
                key: format!("({row_key}, {col_key})"),
                context: format!("pivot of {index} x {columns}"),
            });
        }
        matrix.set(row, col, value);
    }
    debug!(rows = matrix.shape().0, columns = matrix.shape().1, "pivoted");
    Ok(matrix)
}

/// Aggregating pivot: `func` of `values` per (`index`, `columns`) pair.
pub fn pivot_table(
    table: &Table,
    index: &str,
    columns: &str,
    values: &str,
    func: AggFunc,
    fill: &Value,
) -> Result<Matrix> {
    if index == columns {
        return Err(AnalysisError::invalid_request(
            "pivot index and columns must be different columns",
        ));
    }
    let grouped = group_aggregate(table, &[index, columns], &[values], &[func])?;
    pivot(&grouped, index, columns, &func.output_name(values), fill)
}

/// Record counts per (`index`, `columns`) pair, optionally as percentages.
/// Empty combinations are zero.
pub fn crosstab(table: &Table, index: &str, columns: &str, normalize: Normalize) -> Result<Matrix> {
    if index == columns {
        return Err(AnalysisError::invalid_request(
            "crosstab index and columns must be different columns",
        ));
    }
    let grouped = group_aggregate::<_, &str>(table, &[index, columns], &[], &[AggFunc::Count])?;
    let mut matrix = pivot(&grouped, index, columns, COUNT_COLUMN, &Value::Number(0.0))?;
    let counts: Vec<Vec<f64>> = matrix
        .cells
        .iter()
        .map(|row| row.iter().map(|cell| cell.as_f64().unwrap_or(0.0)).collect())
        .collect();
    match normalize {
        Normalize::None => {}
        Normalize::Index => {
            for (row, row_counts) in counts.iter().enumerate() {
                let total: f64 = row_counts.iter().sum();
                for (col, count) in row_counts.iter().enumerate() {
                    matrix.cells[row][col] = Value::Number(percent(*count, total));
                }
            }
            matrix.value_name = "percent".to_string();
        }
        Normalize::Columns => {
            let (rows, cols) = matrix.shape();
            for col in 0..cols {
                let total: f64 = (0..rows).map(|row| counts[row][col]).sum();
                for row in 0..rows {
                    matrix.cells[row][col] = Value::Number(percent(counts[row][col], total));
                }
            }
            matrix.value_name = "percent".to_string();
        }
    }
    Ok(matrix)
}

/// `part / total` as a percentage; zero when the total is zero.
pub fn percent(part: f64, total: f64) -> f64 {
    if total == 0.0 { 0.0 } else { part * 100.0 / total }
}

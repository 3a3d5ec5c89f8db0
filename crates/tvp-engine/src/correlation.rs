//! Pearson correlation between numeric columns.

use tracing::debug;
use tvp_model::{AnalysisError, Matrix, Result, Table, Value};

use crate::stats::pearson;

/// Row and column axis name of a correlation matrix.
pub const FIELD_AXIS: &str = "Field";
pub const CORRELATION_VALUE: &str = "correlation";

fn pairs(table: &Table, a: &str, b: &str) -> Result<Vec<(f64, f64)>> {
    Ok(table
        .numbers(a)?
        .into_iter()
        .zip(table.numbers(b)?)
        .filter_map(|(x, y)| Some((x?, y?)))
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .collect())
}

/// Correlation of `a` and `b` over rows where both are present.
///
/// `None` with fewer than two such rows or when either column is constant
/// over them.
pub fn correlation(table: &Table, a: &str, b: &str) -> Result<Option<f64>> {
    table.require_numeric(a)?;
    table.require_numeric(b)?;
    Ok(pearson(&pairs(table, a, b)?))
}

/// Pairwise correlations of `columns`, or of every numeric column when
/// `columns` is empty. Undefined correlations are null cells.
pub fn correlation_matrix<S: AsRef<str>>(table: &Table, columns: &[S]) -> Result<Matrix> {
    let names: Vec<String> = if columns.is_empty() {
        table
            .schema()
            .fields()
            .iter()
            .filter(|field| field.ty.is_numeric())
            .map(|field| field.name.clone())
            .collect()
    } else {
        columns.iter().map(|name| name.as_ref().to_string()).collect()
    };
    if names.is_empty() {
        return Err(AnalysisError::invalid_request(
            "correlation needs at least one numeric column",
        ));
    }
    for name in &names {
        table.require_numeric(name)?;
    }

    let labels: Vec<Value> = names.iter().map(|name| Value::from(name.as_str())).collect();
    let mut matrix = Matrix::filled(
        FIELD_AXIS,
        FIELD_AXIS,
        CORRELATION_VALUE,
        labels.clone(),
        labels,
        &Value::Null,
    );
    for (row, left) in names.iter().enumerate() {
        for (col, right) in names.iter().enumerate().skip(row) {
            if let Some(score) = pearson(&pairs(table, left, right)?) {
                matrix.set(row, col, Value::Number(score));
                matrix.set(col, row, Value::Number(score));
            }
        }
    }
    debug!(columns = names.len(), "correlation matrix");
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvp_model::{ColumnData, ColumnType};

    fn speeds() -> Table {
        Table::from_columns(vec![
            ColumnData::new(
                "Recorded_Speed",
                ColumnType::Number,
                vec![60.0.into(), 80.0.into(), Value::Null, 100.0.into()],
            ),
            ColumnData::new(
                "Fine_Amount",
                ColumnType::Number,
                vec![200.0.into(), 400.0.into(), 900.0.into(), 600.0.into()],
            ),
            ColumnData::new(
                "Speed_Limit",
                ColumnType::Number,
                vec![50.0.into(), 50.0.into(), 50.0.into(), 50.0.into()],
            ),
            ColumnData::new(
                "Location",
                ColumnType::Text,
                vec!["Goa".into(), "Pune".into(), "Goa".into(), "Delhi".into()],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn perfect_positive_pair() {
        let score = correlation(&speeds(), "Recorded_Speed", "Fine_Amount")
            .unwrap()
            .unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_column_has_no_correlation() {
        assert_eq!(correlation(&speeds(), "Recorded_Speed", "Speed_Limit").unwrap(), None);
    }

    #[test]
    fn text_column_is_type_mismatch() {
        let err = correlation(&speeds(), "Location", "Fine_Amount").unwrap_err();
        assert!(matches!(err, AnalysisError::TypeMismatch { .. }));
    }

    #[test]
    fn matrix_over_numeric_columns() {
        let matrix = correlation_matrix::<&str>(&speeds(), &[]).unwrap();
        assert_eq!(matrix.shape(), (3, 3));
        let speed = Value::from("Recorded_Speed");
        let fine = Value::from("Fine_Amount");
        let limit = Value::from("Speed_Limit");
        let Some(Value::Number(score)) = matrix.get(&fine, &speed) else {
            panic!("expected a score");
        };
        assert!((score - 1.0).abs() < 1e-12);
        assert_eq!(matrix.get(&limit, &limit), Some(&Value::Null));
        assert!(!matrix.is_observed(&limit, &fine));
        assert!(matrix.is_observed(&speed, &speed));
    }
}

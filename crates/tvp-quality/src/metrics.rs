//! Completeness and validity metrics. None of these mutate the table.

use std::collections::HashSet;

use tvp_engine::stats::{quartiles, sorted_values};
use tvp_model::{Result, Table, Value};

/// Fraction of all cells that are null; 0 for a table without cells.
pub fn missing_rate(table: &Table) -> f64 {
    let cells = table.height() * table.width();
    if cells == 0 {
        return 0.0;
    }
    let missing: usize = table
        .frame()
        .get_columns()
        .iter()
        .map(|column| column.null_count())
        .sum();
    missing as f64 / cells as f64
}

/// Fraction of rows that repeat an earlier row exactly.
pub fn duplicate_rate(table: &Table) -> Result<f64> {
    if table.is_empty() {
        return Ok(0.0);
    }
    let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(table.height());
    let mut duplicates = 0usize;
    for row in table.rows()? {
        let key: Vec<Option<String>> = row
            .iter()
            .map(|value| (!value.is_null()).then(|| value.label()))
            .collect();
        if !seen.insert(key) {
            duplicates += 1;
        }
    }
    Ok(duplicates as f64 / table.height() as f64)
}

/// `[Q1 - 1.5 * IQR, Q3 + 1.5 * IQR]` of a numeric column's non-null values.
///
/// `None` when the column is absent, non-numeric or has no values.
pub fn outlier_bounds(table: &Table, column: &str) -> Option<(f64, f64)> {
    let values = table.numbers(column).ok()?;
    let sorted = sorted_values(values);
    let (q1, _, q3) = quartiles(&sorted)?;
    let iqr = q3 - q1;
    Some((q1 - 1.5 * iqr, q3 + 1.5 * iqr))
}

/// Values of `column` outside the IQR fences. An absent or non-numeric
/// column has no outliers.
pub fn outlier_count(table: &Table, column: &str) -> usize {
    let Some((lower, upper)) = outlier_bounds(table, column) else {
        return 0;
    };
    table
        .numbers(column)
        .map(|values| {
            values
                .into_iter()
                .flatten()
                .filter(|value| *value < lower || *value > upper)
                .count()
        })
        .unwrap_or(0)
}

/// Non-null values of `column` that `accepts` rejects. An absent column has
/// no violations.
pub fn domain_violation_count(table: &Table, column: &str, accepts: impl Fn(&Value) -> bool) -> Result<usize> {
    if !table.has_column(column) {
        return Ok(0);
    }
    Ok(table
        .values(column)?
        .iter()
        .filter(|value| !value.is_null() && !accepts(value))
        .count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvp_model::{ColumnData, ColumnType};

    fn speeds(values: Vec<Value>) -> Table {
        Table::from_columns(vec![ColumnData::new("Recorded_Speed", ColumnType::Number, values)]).unwrap()
    }

    #[test]
    fn single_extreme_value_is_an_outlier() {
        let table = speeds(vec![10.0.into(), 12.0.into(), 11.0.into(), 13.0.into(), 1000.0.into()]);
        assert_eq!(outlier_count(&table, "Recorded_Speed"), 1);
        assert_eq!(outlier_bounds(&table, "Recorded_Speed"), Some((8.0, 16.0)));
    }

    #[test]
    fn outliers_not_applicable() {
        let table = speeds(vec![10.0.into()]);
        assert_eq!(outlier_count(&table, "Fine_Amount"), 0);
        let text = Table::from_columns(vec![ColumnData::new(
            "Weather",
            ColumnType::Text,
            vec!["Fog".into()],
        )])
        .unwrap();
        assert_eq!(outlier_count(&text, "Weather"), 0);
        assert_eq!(outlier_count(&speeds(vec![Value::Null]), "Recorded_Speed"), 0);
    }

    #[test]
    fn missing_and_duplicate_rates() {
        let table = Table::from_columns(vec![
            ColumnData::new(
                "Location",
                ColumnType::Text,
                vec!["Pune".into(), "Pune".into(), Value::Null, Value::Null],
            ),
            ColumnData::new(
                "Fine_Amount",
                ColumnType::Number,
                vec![100.0.into(), 100.0.into(), Value::Null, 200.0.into()],
            ),
        ])
        .unwrap();
        assert_eq!(missing_rate(&table), 3.0 / 8.0);
        assert_eq!(duplicate_rate(&table).unwrap(), 0.25);
        assert_eq!(missing_rate(&table.empty_like()), 0.0);
        assert_eq!(duplicate_rate(&table.empty_like()).unwrap(), 0.0);
    }

    #[test]
    fn null_is_distinct_from_empty_text_for_duplicates() {
        let table = Table::from_columns(vec![ColumnData::new(
            "Location",
            ColumnType::Text,
            vec![Value::Null, "".into()],
        )])
        .unwrap();
        assert_eq!(duplicate_rate(&table).unwrap(), 0.0);
    }

    #[test]
    fn ages_outside_domain() {
        let table = Table::from_columns(vec![ColumnData::new(
            "Driver_Age",
            ColumnType::Number,
            vec![15.0.into(), 16.0.into(), 100.0.into(), 101.0.into(), Value::Null],
        )])
        .unwrap();
        let adult = |value: &Value| value.as_f64().is_some_and(|age| (16.0..=100.0).contains(&age));
        assert_eq!(domain_violation_count(&table, "Driver_Age", adult).unwrap(), 2);
        assert_eq!(domain_violation_count(&table, "Age", adult).unwrap(), 0);
    }
}

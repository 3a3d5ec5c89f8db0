//! Frequency tables.

use tvp_model::{Result, Table, Value};

use crate::aggregate::{AggFunc, COUNT_COLUMN, group_aggregate};
use crate::present::sort_table;

/// Occurrences of each non-null value of `column`, most frequent first.
/// Ties keep first-appearance order.
pub fn value_counts(table: &Table, column: &str) -> Result<Table> {
    let grouped = group_aggregate::<_, &str>(table, &[column], &[], &[AggFunc::Count])?;
    sort_table(&grouped, COUNT_COLUMN, true)
}

/// The `n` most frequent values of `column` with their counts.
pub fn top_n(table: &Table, column: &str, n: usize) -> Result<Table> {
    Ok(value_counts(table, column)?.head(n))
}

/// Most frequent non-null value; the earliest one on ties.
pub fn mode(table: &Table, column: &str) -> Result<Option<Value>> {
    let counts = top_n(table, column, 1)?;
    Ok(counts.values(column)?.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvp_model::{ColumnData, ColumnType};

    fn weather() -> Table {
        Table::from_columns(vec![ColumnData::new(
            "Weather_Condition",
            ColumnType::Text,
            vec![
                "Clear".into(),
                "Fog".into(),
                "Rain".into(),
                "Fog".into(),
                Value::Null,
                "Rain".into(),
                "Snow".into(),
            ],
        )])
        .unwrap()
    }

    #[test]
    fn counts_descending_with_stable_ties() {
        let counts = value_counts(&weather(), "Weather_Condition").unwrap();
        assert_eq!(
            counts.values("Weather_Condition").unwrap(),
            vec![
                Value::from("Fog"),
                Value::from("Rain"),
                Value::from("Clear"),
                Value::from("Snow")
            ]
        );
        assert_eq!(
            counts.numbers(COUNT_COLUMN).unwrap(),
            vec![Some(2.0), Some(2.0), Some(1.0), Some(1.0)]
        );
    }

    #[test]
    fn top_and_mode() {
        assert_eq!(top_n(&weather(), "Weather_Condition", 3).unwrap().height(), 3);
        assert_eq!(mode(&weather(), "Weather_Condition").unwrap(), Some(Value::from("Fog")));
        let empty = weather().empty_like();
        assert_eq!(mode(&empty, "Weather_Condition").unwrap(), None);
    }
}

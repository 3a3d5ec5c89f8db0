//! Per-column summary statistics.

use std::collections::HashMap;

use tvp_model::{ColumnData, ColumnType, Result, Table, Value};

use crate::stats::{mean, quartiles, sample_std, sorted_values};

pub const DESCRIBE_COLUMNS: [&str; 14] = [
    "Field", "Type", "Count", "Missing", "Unique", "Top", "Freq", "Mean", "Std", "Min", "25%",
    "50%", "75%", "Max",
];

/// One row per column of `table`.
///
/// `Top`/`Freq` (most frequent label, earliest on ties) are filled for
/// non-numeric columns; the numeric statistics only for numeric ones.
pub fn describe(table: &Table) -> Result<Table> {
    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(table.width());
    for field in table.schema().fields() {
        let values = table.values(&field.name)?;
        let present: Vec<&Value> = values.iter().filter(|value| !value.is_null()).collect();

        let mut frequencies: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();
        for value in &present {
            let label = value.label();
            let count = frequencies.entry(label.clone()).or_insert(0);
            if *count == 0 {
                first_seen.push(label);
            }
            *count += 1;
        }

        let mut row = vec![
            Value::from(field.name.as_str()),
            Value::from(field.ty.as_str()),
            Value::Number(present.len() as f64),
            Value::Number((values.len() - present.len()) as f64),
            Value::Number(frequencies.len() as f64),
        ];

        if field.ty == ColumnType::Number {
            row.extend([Value::Null, Value::Null]);
            let sorted = sorted_values(values.iter().map(Value::as_f64));
            let quartile_values = quartiles(&sorted);
            row.extend([
                Value::from(mean(&sorted)),
                Value::from(sample_std(&sorted)),
                Value::from(sorted.first().copied()),
                Value::from(quartile_values.map(|q| q.0)),
                Value::from(quartile_values.map(|q| q.1)),
                Value::from(quartile_values.map(|q| q.2)),
                Value::from(sorted.last().copied()),
            ]);
        } else {
            let mut top: Option<(&str, usize)> = None;
            for label in &first_seen {
                let count = frequencies.get(label).copied().unwrap_or(0);
                if top.is_none_or(|(_, best)| count > best) {
                    top = Some((label.as_str(), count));
                }
            }
            row.push(top.map_or(Value::Null, |(label, _)| Value::from(label)));
            row.push(top.map_or(Value::Null, |(_, count)| Value::Number(count as f64)));
            row.extend(std::iter::repeat_n(Value::Null, 7));
        }
        rows.push(row);
    }

    let columns = DESCRIBE_COLUMNS
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let ty = if matches!(idx, 0 | 1 | 5) {
                ColumnType::Text
            } else {
                ColumnType::Number
            };
            ColumnData::new(*name, ty, rows.iter().map(|row| row[idx].clone()).collect())
        })
        .collect();
    Table::from_columns(columns)
}

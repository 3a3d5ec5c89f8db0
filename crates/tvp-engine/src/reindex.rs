//! Fixed-domain ordering of result rows.

use std::collections::HashMap;

use tracing::debug;
use tvp_model::{AnalysisError, ColumnData, Result, Table, Value};

/// Reorders `table` so its `dimension` column follows `order` exactly.
///
/// One output row per entry of `order`: the matching input row, or a new
/// row whose dimension cell is the category and whose other cells are
/// `fill` (null where `fill` does not fit the column type). Input rows
/// whose category is not in `order` are dropped.
///
/// The input must hold at most one row per category, as a grouped result
/// does; a repeated category is a [`AnalysisError::DuplicateEntry`].
pub fn ordered_reindex(table: &Table, dimension: &str, order: &[Value], fill: &Value) -> Result<Table> {
    let dimension_type = table.column_type(dimension)?;
    let keys = table.values(dimension)?;
    let mut rows_by_key: HashMap<String, usize> = HashMap::new();
    for (idx, key) in keys.iter().enumerate() {
        if key.is_null() {
            continue;
        }
        if rows_by_key.insert(key.label(), idx).is_some() {
            return Err(AnalysisError::DuplicateEntry {
                key: key.label(),
                context: format!("reindex of {dimension}"),
            });
        }
    }
    let sources: Vec<Option<usize>> = order
        .iter()
        .map(|category| rows_by_key.get(&category.label()).copied())
        .collect();

    let mut columns = Vec::with_capacity(table.width());
    for field in table.schema().fields() {
        let values = table.values(&field.name)?;
        let filler = if fill.column_type() == Some(field.ty) {
            fill.clone()
        } else {
            Value::Null
        };
        let reordered = order
            .iter()
            .zip(&sources)
            .map(|(category, source)| match source {
                Some(idx) => values[*idx].clone(),
                None if field.name == dimension => {
                    Value::parse_as(&category.label(), dimension_type).unwrap_or_default()
                }
                None => filler.clone(),
            })
            .collect();
        columns.push(ColumnData::new(field.name.clone(), field.ty, reordered));
    }
    let inserted = sources.iter().filter(|source| source.is_none()).count();
    debug!(categories = order.len(), inserted, "ordered reindex");
    Table::from_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvp_model::{CanonicalOrder, ColumnType};

    fn monthly() -> Table {
        Table::from_columns(vec![
            ColumnData::new(
                "Month",
                ColumnType::Text,
                vec!["March".into(), "January".into(), "Smarch".into()],
            ),
            ColumnData::new(
                "count",
                ColumnType::Number,
                vec![4.0.into(), 7.0.into(), 1.0.into()],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn follows_calendar_order_and_fills_gaps() {
        let months = CanonicalOrder::Months.values();
        let result = ordered_reindex(&monthly(), "Month", &months, &Value::Number(0.0)).unwrap();
        assert_eq!(result.height(), 12);
        assert_eq!(result.values("Month").unwrap(), months);
        let counts = result.numbers("count").unwrap();
        assert_eq!(counts[0], Some(7.0));
        assert_eq!(counts[1], Some(0.0));
        assert_eq!(counts[2], Some(4.0));
    }

    #[test]
    fn fill_of_other_type_leaves_null() {
        let order = vec![Value::from("January"), Value::from("February")];
        let result = ordered_reindex(&monthly(), "Month", &order, &Value::from("n/a")).unwrap();
        assert_eq!(result.numbers("count").unwrap(), vec![Some(7.0), None]);
    }

    #[test]
    fn duplicate_categories_are_rejected() {
        let table = Table::from_columns(vec![ColumnData::new(
            "Month",
            ColumnType::Text,
            vec!["May".into(), "May".into()],
        )])
        .unwrap();
        let err = ordered_reindex(&table, "Month", &CanonicalOrder::Months.values(), &Value::Null)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::DuplicateEntry { .. }));
    }

    #[test]
    fn numeric_dimension() {
        let table = Table::from_columns(vec![
            ColumnData::new("Hour", ColumnType::Number, vec![23.0.into(), 2.0.into()]),
            ColumnData::new("count", ColumnType::Number, vec![5.0.into(), 3.0.into()]),
        ])
        .unwrap();
        let result =
            ordered_reindex(&table, "Hour", &CanonicalOrder::Hours.values(), &Value::Number(0.0))
                .unwrap();
        assert_eq!(result.height(), 24);
        assert_eq!(result.numbers("count").unwrap()[2], Some(3.0));
        assert_eq!(result.numbers("count").unwrap()[23], Some(5.0));
        assert_eq!(result.numbers("Hour").unwrap()[10], Some(10.0));
    }
}

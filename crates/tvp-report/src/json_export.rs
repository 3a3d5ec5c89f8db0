//! JSON views of results for chart and table renderers.

use serde_json::{Map, Value as JsonValue, json};
use tvp_model::{Matrix, Table, Value};

use crate::error::Result;

fn cell_json(value: &Value) -> Result<JsonValue> {
    Ok(match value {
        Value::DateTime(_) => JsonValue::String(value.label()),
        other => serde_json::to_value(other)?,
    })
}

/// One object per row, keyed by column name.
pub fn table_to_json(table: &Table) -> Result<JsonValue> {
    let names = table.column_names();
    let mut records = Vec::with_capacity(table.height());
    for row in table.rows()? {
        let mut record = Map::with_capacity(names.len());
        for (name, value) in names.iter().zip(&row) {
            record.insert(name.clone(), cell_json(value)?);
        }
        records.push(JsonValue::Object(record));
    }
    Ok(JsonValue::Array(records))
}

/// Axis labels and the cell grid, row-major.
pub fn matrix_to_json(matrix: &Matrix) -> Result<JsonValue> {
    let labels = |values: &[Value]| values.iter().map(cell_json).collect::<Result<Vec<_>>>();
    let cells = matrix
        .cells
        .iter()
        .map(|row| labels(row))
        .collect::<Result<Vec<_>>>()?;
    Ok(json!({
        "index": matrix.index_name,
        "columns": matrix.columns_name,
        "value": matrix.value_name,
        "row_labels": labels(&matrix.row_labels)?,
        "column_labels": labels(&matrix.column_labels)?,
        "cells": cells,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvp_model::{ColumnData, ColumnType};

    #[test]
    fn records_keep_types() {
        let table = Table::from_columns(vec![
            ColumnData::new("Month", ColumnType::Text, vec!["Jan".into(), Value::Null]),
            ColumnData::new("percent", ColumnType::Number, vec![12.5.into(), 0.0.into()]),
        ])
        .unwrap();
        let json = table_to_json(&table).unwrap();
        assert_eq!(
            json,
            json!([
                {"Month": "Jan", "percent": 12.5},
                {"Month": null, "percent": 0.0}
            ])
        );
    }

    #[test]
    fn matrix_layout() {
        let matrix = Matrix::filled(
            "Location",
            "Violation_Type",
            "Fine_Amount",
            vec!["Goa".into()],
            vec!["Speeding".into(), "Parking".into()],
            &Value::Number(0.0),
        );
        let json = matrix_to_json(&matrix).unwrap();
        assert_eq!(json["row_labels"], json!(["Goa"]));
        assert_eq!(json["cells"], json!([[0.0, 0.0]]));
        assert_eq!(json["value"], "Fine_Amount");
    }
}

//! Re-typing a column of an existing table.

use tracing::warn;
use tvp_model::{ColumnType, Outcome, Result, Table, coerce_column};

/// Replaces `column` with its values coerced to `ty`.
///
/// Cells are coerced from their labels, so a text column of `"₹1,200"`
/// becomes the number 1200. Cells that do not coerce become null and are
/// reported in a single warning.
pub fn coerce_table_column(table: &Table, column: &str, ty: ColumnType) -> Result<Outcome<Table>> {
    let current = table.column_type(column)?;
    if current == ty {
        return Ok(Outcome::new(table.clone()));
    }
    let raw: Vec<Option<String>> = table
        .values(column)?
        .iter()
        .map(|value| (!value.is_null()).then(|| value.label()))
        .collect();
    let (data, warnings) = coerce_column(column, &raw, ty).into_parts();
    for warning in &warnings {
        warn!(column, %warning, "coercion failed");
    }
    Ok(Outcome::with_warnings(table.with_column(&data)?, warnings))
}

//! Explicit column coercion: raw text to a declared type, null on failure.

use crate::outcome::{Outcome, Warning};
use crate::table::ColumnData;
use crate::value::{ColumnType, Value};

/// Maximum number of failing raw values quoted in a warning.
pub const WARNING_SAMPLE_LIMIT: usize = 5;

/// Coerces raw cells into a column of type `ty`.
///
/// Blank and missing cells become null silently; non-blank cells that fail
/// to coerce become null and are counted in a single
/// [`Warning::CoercionFailed`] for the column.
pub fn coerce_column<S: AsRef<str>>(
    name: &str,
    raw: &[Option<S>],
    ty: ColumnType,
) -> Outcome<ColumnData> {
    let mut values = Vec::with_capacity(raw.len());
    let mut failed = 0usize;
    let mut samples: Vec<String> = Vec::new();
    for cell in raw {
        let Some(cell) = cell else {
            values.push(Value::Null);
            continue;
        };
        match Value::parse_as(cell.as_ref(), ty) {
            Some(value) => values.push(value),
            None => {
                failed += 1;
                let sample = cell.as_ref().trim().to_string();
                if samples.len() < WARNING_SAMPLE_LIMIT && !samples.contains(&sample) {
                    samples.push(sample);
                }
                values.push(Value::Null);
            }
        }
    }
    let column = ColumnData::new(name, ty, values);
    if failed == 0 {
        return Outcome::new(column);
    }
    Outcome::with_warnings(
        column,
        vec![Warning::CoercionFailed {
            column: name.to_string(),
            target: ty,
            failed,
            samples,
        }],
    )
}

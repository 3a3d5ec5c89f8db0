//! One-time column type inference for undeclared columns.

use tvp_common::{is_boolean_token, parse_datetime, parse_number};
use tvp_model::ColumnType;

/// Infers the type of a raw column.
///
/// - Boolean when every non-blank value is a yes/no style word.
/// - Number when at least `threshold` of non-blank values coerce to numbers.
/// - DateTime when at least `threshold` parse as dates or datetimes.
/// - Text otherwise, including all-blank columns.
pub fn infer_column_type<S: AsRef<str>>(values: &[Option<S>], threshold: f64) -> ColumnType {
    let present: Vec<&str> = values
        .iter()
        .flatten()
        .map(AsRef::as_ref)
        .filter(|value| !value.trim().is_empty())
        .collect();
    if present.is_empty() {
        return ColumnType::Text;
    }
    if present.iter().all(|value| is_boolean_token(value)) {
        return ColumnType::Boolean;
    }
    let total = present.len() as f64;
    let numeric = present
        .iter()
        .filter(|value| parse_number(value).is_some())
        .count();
    if numeric as f64 / total >= threshold {
        return ColumnType::Number;
    }
    let dates = present
        .iter()
        .filter(|value| parse_datetime(value).is_some())
        .count();
    if dates as f64 / total >= threshold {
        return ColumnType::DateTime;
    }
    ColumnType::Text
}

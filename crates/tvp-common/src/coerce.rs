//! Raw string coercion.
//!
//! Every function here maps a raw cell to `Some(typed)` or `None`. Callers
//! treat `None` on a non-empty cell as a coercion failure and record it.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Currency markers stripped before numeric parsing, longest first.
const CURRENCY_MARKERS: &[&str] = &["INR", "Rs.", "Rs", "₹", "$", "€", "£"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];

const TIME_FORMATS: &[&str] = &[
    "%H:%M:%S",
    "%H:%M",
    "%I:%M %p",
    "%I:%M:%S %p",
    "%I:%M%p",
];

/// Parses a numeric cell after stripping currency symbols, thousands
/// separators, percent signs and whitespace.
///
/// # Examples
///
/// ```
/// use tvp_common::parse_number;
///
/// assert_eq!(parse_number("₹1,250.50"), Some(1250.5));
/// assert_eq!(parse_number("45%"), Some(45.0));
/// assert_eq!(parse_number("n/a"), None);
/// ```
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut text = trimmed.to_string();
    for marker in CURRENCY_MARKERS {
        if text.contains(marker) {
            text = text.replace(marker, "");
        }
    }
    let cleaned: String = text
        .chars()
        .filter(|ch| !matches!(ch, ',' | '%' | '_') && !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses a yes/no style flag. Accepts `yes/no`, `y/n`, `true/false`,
/// `t/f` and `1/0`, case-insensitively.
pub fn parse_boolean(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "t" | "1" => Some(true),
        "no" | "n" | "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

/// Returns true for word-form boolean tokens.
///
/// Digits are excluded so that 0/1 count columns are not mistaken for flags
/// during type inference.
pub fn is_boolean_token(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "yes" | "no" | "y" | "n" | "true" | "false"
    )
}

/// Parses a date or datetime cell. Dates resolve to midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parses a time-of-day cell (`14:35`, `14:35:00`, `2:35 PM`). Full
/// datetimes are accepted and reduced to their time component.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
        .or_else(|| parse_datetime(trimmed).map(|datetime| datetime.time()))
}

//! Column types and cell values.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use polars::prelude::{AnyValue, DataType, TimeUnit};
use serde::{Deserialize, Serialize};
use tvp_common::{
    any_to_datetime, any_to_f64, any_to_string, format_numeric, parse_boolean, parse_datetime,
    parse_number,
};

/// Declared type of a table column, fixed once when the table is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Boolean,
    DateTime,
}

impl ColumnType {
    /// Maps a Polars dtype to the table column type, if supported.
    pub fn from_dtype(dtype: &DataType) -> Option<Self> {
        match dtype {
            DataType::String | DataType::Null => Some(Self::Text),
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64 => Some(Self::Number),
            DataType::Boolean => Some(Self::Boolean),
            DataType::Datetime(_, _) | DataType::Date => Some(Self::DateTime),
            _ => None,
        }
    }

    /// Physical dtype used when a column of this type is materialized.
    pub fn dtype(self) -> DataType {
        match self {
            Self::Text => DataType::String,
            Self::Number => DataType::Float64,
            Self::Boolean => DataType::Boolean,
            Self::DateTime => DataType::Datetime(TimeUnit::Milliseconds, None),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
        }
    }

    pub fn is_numeric(self) -> bool {
        self == Self::Number
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "string" | "str" => Ok(Self::Text),
            "number" | "numeric" | "float" | "int" => Ok(Self::Number),
            "boolean" | "bool" | "flag" => Ok(Self::Boolean),
            "datetime" | "date" | "timestamp" => Ok(Self::DateTime),
            other => Err(format!(
                "unknown column type '{other}' (expected text, number, boolean or datetime)"
            )),
        }
    }
}

/// A single cell. `Null` stands for missing or uncoercible input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

impl Value {
    /// Reads a Polars cell as a value of the given column type.
    pub fn from_any(value: AnyValue<'_>, ty: ColumnType) -> Self {
        if matches!(value, AnyValue::Null) {
            return Self::Null;
        }
        match ty {
            ColumnType::Text => Self::Text(any_to_string(value)),
            ColumnType::Number => any_to_f64(value).map_or(Self::Null, Self::Number),
            ColumnType::Boolean => match value {
                AnyValue::Boolean(b) => Self::Boolean(b),
                _ => Self::Null,
            },
            ColumnType::DateTime => any_to_datetime(value).map_or(Self::Null, Self::DateTime),
        }
    }

    /// Coerces a raw cell into `ty`.
    ///
    /// Returns `Some(Value::Null)` for blank input and `None` when a
    /// non-blank cell cannot be coerced. Text is kept as written.
    pub fn parse_as(raw: &str, ty: ColumnType) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Some(Self::Null);
        }
        match ty {
            ColumnType::Text => Some(Self::Text(raw.to_string())),
            ColumnType::Number => parse_number(trimmed).map(Self::Number),
            ColumnType::Boolean => parse_boolean(trimmed).map(Self::Boolean),
            ColumnType::DateTime => parse_datetime(trimmed).map(Self::DateTime),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Type of a non-null value.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Self::Null => None,
            Self::Boolean(_) => Some(ColumnType::Boolean),
            Self::Number(_) => Some(ColumnType::Number),
            Self::DateTime(_) => Some(ColumnType::DateTime),
            Self::Text(_) => Some(ColumnType::Text),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Canonical rendering used for group keys, matrix axes and export.
    pub fn label(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Boolean(b) => if *b { "Yes" } else { "No" }.to_string(),
            Self::Number(v) => format_numeric(*v),
            Self::DateTime(dt) => {
                if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            Self::Text(s) => s.clone(),
        }
    }

    /// True when both values render to the same key.
    pub fn same_key(&self, other: &Value) -> bool {
        self.is_null() == other.is_null() && self.label() == other.label()
    }

    /// Total ordering: nulls first, then booleans, numbers, datetimes, text.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Boolean(_) => 1,
            Self::Number(_) => 2,
            Self::DateTime(_) => 3,
            Self::Text(_) => 4,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Self::Null
        } else {
            Self::Number(value)
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

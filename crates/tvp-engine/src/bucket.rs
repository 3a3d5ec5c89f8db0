//! Derived time-bucket columns (year, month, weekday, hour, time of day).

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tvp_common::{parse_datetime, parse_time};
use tvp_model::calendar::{month_name, time_block, weekday_name};
use tvp_model::{
    AnalysisError, CanonicalOrder, ColumnData, ColumnType, Outcome, Result, Table, Value, Warning,
};

/// Calendar or clock bucket derived from a date/time column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    Year,
    /// Month name, `January`..`December`.
    Month,
    MonthNumber,
    /// `YYYY-MM`.
    YearMonth,
    /// Weekday name, `Monday`..`Sunday`.
    DayOfWeek,
    Hour,
    /// `Night`, `Morning`, `Afternoon` or `Evening`.
    TimeBlock,
}

impl TimeBucket {
    pub fn default_column(self) -> &'static str {
        match self {
            Self::Year => "Year",
            Self::Month => "Month",
            Self::MonthNumber => "Month_Number",
            Self::YearMonth => "Year_Month",
            Self::DayOfWeek => "Day_of_Week",
            Self::Hour => "Hour",
            Self::TimeBlock => "Time_Block",
        }
    }

    pub fn output_type(self) -> ColumnType {
        match self {
            Self::Year | Self::MonthNumber | Self::Hour => ColumnType::Number,
            Self::Month | Self::YearMonth | Self::DayOfWeek | Self::TimeBlock => ColumnType::Text,
        }
    }

    /// Fixed display order of the bucket's categories, if it has one.
    pub fn canonical_order(self) -> Option<CanonicalOrder> {
        match self {
            Self::Month => Some(CanonicalOrder::Months),
            Self::DayOfWeek => Some(CanonicalOrder::Weekdays),
            Self::Hour => Some(CanonicalOrder::Hours),
            Self::TimeBlock => Some(CanonicalOrder::TimeBlocks),
            Self::Year | Self::MonthNumber | Self::YearMonth => None,
        }
    }

    fn uses_clock(self) -> bool {
        matches!(self, Self::Hour | Self::TimeBlock)
    }

    fn of_datetime(self, when: NaiveDateTime) -> Value {
        match self {
            Self::Year => Value::Number(f64::from(when.year())),
            Self::Month => month_name(when.month()).map_or(Value::Null, Value::from),
            Self::MonthNumber => Value::Number(f64::from(when.month())),
            Self::YearMonth => Value::Text(when.format("%Y-%m").to_string()),
            Self::DayOfWeek => Value::from(weekday_name(when.weekday())),
            Self::Hour | Self::TimeBlock => self.of_hour(when.hour()),
        }
    }

    fn of_hour(self, hour: u32) -> Value {
        match self {
            Self::TimeBlock => time_block(hour).map_or(Value::Null, Value::from),
            _ => Value::Number(f64::from(hour)),
        }
    }
}

/// Adds a `bucket` column computed from `source`, named `target` or the
/// bucket's default column name.
///
/// DateTime sources are used directly. Text sources are parsed (clock
/// formats for hour buckets, date formats otherwise); values that do not
/// parse become null and are reported in a [`Warning::UnparsedDates`].
/// Number sources are accepted as hours of the day for hour buckets.
pub fn derive_time_bucket(
    table: &Table,
    source: &str,
    bucket: TimeBucket,
    target: Option<&str>,
) -> Result<Outcome<Table>> {
    let source_type = table.column_type(source)?;
    let values = table.values(source)?;
    let mut unparsed = 0usize;
    let derived: Vec<Value> = match source_type {
        ColumnType::DateTime => values
            .iter()
            .map(|value| value.as_datetime().map_or(Value::Null, |when| bucket.of_datetime(when)))
            .collect(),
        ColumnType::Text => values
            .iter()
            .map(|value| {
                let Some(raw) = value.as_str() else {
                    return Value::Null;
                };
                let parsed = if bucket.uses_clock() {
                    parse_time(raw).map(|time: NaiveTime| bucket.of_hour(time.hour()))
                } else {
                    parse_datetime(raw).map(|when| bucket.of_datetime(when))
                };
                parsed.unwrap_or_else(|| {
                    unparsed += 1;
                    Value::Null
                })
            })
            .collect(),
        ColumnType::Number if bucket.uses_clock() => values
            .iter()
            .map(|value| {
                let Some(hour) = value.as_f64() else {
                    return Value::Null;
                };
                if hour.fract() == 0.0 && (0.0..24.0).contains(&hour) {
                    bucket.of_hour(hour as u32)
                } else {
                    unparsed += 1;
                    Value::Null
                }
            })
            .collect(),
        found => {
            return Err(AnalysisError::TypeMismatch {
                column: source.to_string(),
                expected: ColumnType::DateTime,
                found,
            });
        }
    };

    let name = target.unwrap_or(bucket.default_column());
    let result = table.with_column(&ColumnData::new(name, bucket.output_type(), derived))?;
    let mut warnings = Vec::new();
    if unparsed > 0 {
        warn!(column = source, count = unparsed, "unparsed date values left out of buckets");
        warnings.push(Warning::UnparsedDates {
            column: source.to_string(),
            count: unparsed,
        });
    }
    debug!(source, column = name, ?bucket, "derived time bucket");
    Ok(Outcome::with_warnings(result, warnings))
}

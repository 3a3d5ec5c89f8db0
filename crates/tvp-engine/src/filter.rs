//! Row filters producing derived tables.

use chrono::{Days, NaiveDate};
use polars::prelude::*;
use tracing::debug;
use tvp_model::{AnalysisError, ColumnType, Result, Table, Value};

use crate::predicate::Predicate;

/// Rows for which `predicate` holds.
pub fn filter_rows(table: &Table, predicate: &Predicate) -> Result<Table> {
    let expr = predicate.compile(table)?;
    let frame = table.frame().clone().lazy().filter(expr).collect()?;
    let filtered = Table::new(frame)?;
    debug!(before = table.height(), after = filtered.height(), "filtered rows");
    Ok(filtered)
}

/// Rows whose `column` equals one of `values`. An empty selection keeps
/// nothing.
pub fn filter_in(table: &Table, column: &str, values: &[Value]) -> Result<Table> {
    filter_rows(table, &Predicate::one_of(column, values.iter().cloned()))
}

/// Rows whose `column` falls on a calendar day in `[start, end]`.
///
/// Rows with a null date are dropped.
pub fn filter_date_range(table: &Table, column: &str, start: NaiveDate, end: NaiveDate) -> Result<Table> {
    if start > end {
        return Err(AnalysisError::InvalidDateRange { start, end });
    }
    let found = table.column_type(column)?;
    if found != ColumnType::DateTime {
        return Err(AnalysisError::TypeMismatch {
            column: column.to_string(),
            expected: ColumnType::DateTime,
            found,
        });
    }
    let lower = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis();
    let upper = end
        .checked_add_days(Days::new(1))
        .map(|next| next.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis())
        .unwrap_or(i64::MAX);
    let millis = col(column).cast(DataType::Int64);
    let frame = table
        .frame()
        .clone()
        .lazy()
        .filter(millis.clone().gt_eq(lit(lower)).and(millis.lt(lit(upper))))
        .collect()?;
    let filtered = Table::new(frame)?;
    debug!(%start, %end, rows = filtered.height(), "date range filter");
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvp_model::ColumnData;

    fn dated() -> Table {
        let day = |d: u32, h: u32| {
            Value::DateTime(
                NaiveDate::from_ymd_opt(2023, 3, d)
                    .unwrap()
                    .and_hms_opt(h, 30, 0)
                    .unwrap(),
            )
        };
        Table::from_columns(vec![
            ColumnData::new(
                "Date",
                ColumnType::DateTime,
                vec![day(1, 9), day(2, 23), Value::Null, day(3, 0), day(5, 12)],
            ),
            ColumnData::new(
                "Location",
                ColumnType::Text,
                vec!["Pune".into(), "Delhi".into(), "Pune".into(), "Goa".into(), "Delhi".into()],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn date_range_is_inclusive_by_day() {
        let start = NaiveDate::from_ymd_opt(2023, 3, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 3, 3).unwrap();
        let result = filter_date_range(&dated(), "Date", start, end).unwrap();
        assert_eq!(
            result.values("Location").unwrap(),
            vec![Value::from("Delhi"), Value::from("Goa")]
        );
    }

    #[test]
    fn reversed_range_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2023, 3, 5).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        let err = filter_date_range(&dated(), "Date", start, end).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidDateRange { .. }));
    }

    #[test]
    fn date_range_needs_datetime_column() {
        let day = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        let err = filter_date_range(&dated(), "Location", day, day).unwrap_err();
        assert!(matches!(err, AnalysisError::TypeMismatch { .. }));
    }

    #[test]
    fn filter_in_selected_values() {
        let result = filter_in(&dated(), "Location", &["delhi".into(), "Goa".into()]).unwrap();
        assert_eq!(result.height(), 3);
        let none = filter_in(&dated(), "Location", &[]).unwrap();
        assert!(none.is_empty());
        assert_eq!(none.column_names(), vec!["Date", "Location"]);
    }
}

//! Rule-based risk flags over whole records.

use serde::Serialize;
use tracing::debug;
use tvp_engine::stats::{quantile, sorted_values};
use tvp_engine::{CompareOp, Predicate, percent, value_counts};
use tvp_model::{ColumnType, Result, Table};

use crate::rules::FlagSettings;

/// Rows raising one flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagCount {
    pub flag: String,
    pub count: usize,
    /// Share of all rows.
    pub percent: f64,
}

fn flag_count(table: &Table, flag: &str, predicate: &Predicate) -> Result<FlagCount> {
    let count = predicate.mask(table)?.into_iter().filter(|hit| *hit).count();
    Ok(FlagCount {
        flag: flag.to_string(),
        count,
        percent: percent(count as f64, table.height() as f64),
    })
}

fn is_numeric(table: &Table, column: &str) -> bool {
    table.column_type(column).is_ok_and(ColumnType::is_numeric)
}

/// Counts of over-speeding, high-fine, repeat-offender and bad-weather
/// records. A flag whose columns are missing is left out.
pub fn flag_summary(table: &Table, settings: &FlagSettings) -> Result<Vec<FlagCount>> {
    let mut flags = Vec::new();

    if is_numeric(table, &settings.speed_column) && is_numeric(table, &settings.speed_limit_column) {
        let predicate = Predicate::compare_columns(
            settings.speed_column.as_str(),
            CompareOp::Gt,
            settings.speed_limit_column.as_str(),
        );
        flags.push(flag_count(table, "Over_Speeding", &predicate)?);
    }

    if is_numeric(table, &settings.fine_column) {
        let sorted = sorted_values(table.numbers(&settings.fine_column)?);
        if let Some(threshold) = quantile(&sorted, settings.high_fine_quantile) {
            let predicate =
                Predicate::compare(settings.fine_column.as_str(), CompareOp::Gt, threshold);
            flags.push(flag_count(table, "High_Fine", &predicate)?);
        }
    }

    if table.has_column(&settings.driver_column) {
        let counts = value_counts(table, &settings.driver_column)?;
        let repeat_drivers: Vec<_> = counts
            .values(&settings.driver_column)?
            .into_iter()
            .zip(counts.numbers(tvp_engine::COUNT_COLUMN)?)
            .filter(|(_, count)| count.unwrap_or(0.0) > settings.repeat_offender_threshold as f64)
            .map(|(driver, _)| driver)
            .collect();
        let predicate = Predicate::one_of(settings.driver_column.as_str(), repeat_drivers);
        flags.push(flag_count(table, "Repeat_Offender", &predicate)?);
    }

    if table.has_column(&settings.weather_column) {
        let predicate = Predicate::one_of(
            settings.weather_column.as_str(),
            settings.bad_weather.iter().map(String::as_str),
        );
        flags.push(flag_count(table, "Bad_Weather_Risk", &predicate)?);
    }

    debug!(flags = flags.len(), "rule-based flags");
    Ok(flags)
}

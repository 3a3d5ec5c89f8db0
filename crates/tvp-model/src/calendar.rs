//! Fixed domain orderings used to lay out time-bucketed results.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::value::Value;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Display order of the time-of-day blocks.
pub const TIME_BLOCKS: [&str; 4] = ["Morning", "Afternoon", "Evening", "Night"];

/// Named canonical orderings accepted by requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalOrder {
    Months,
    Weekdays,
    TimeBlocks,
    Hours,
}

impl CanonicalOrder {
    pub fn values(self) -> Vec<Value> {
        match self {
            Self::Months => MONTH_NAMES.iter().map(|&name| Value::from(name)).collect(),
            Self::Weekdays => WEEKDAY_NAMES.iter().map(|&name| Value::from(name)).collect(),
            Self::TimeBlocks => TIME_BLOCKS.iter().map(|&name| Value::from(name)).collect(),
            Self::Hours => (0..24).map(|hour| Value::Number(f64::from(hour))).collect(),
        }
    }
}

/// Month name for a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month.checked_sub(1)?).ok()?;
    MONTH_NAMES.get(idx).copied()
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES[weekday.num_days_from_monday() as usize]
}

/// Time block of an hour: [0,6) Night, [6,12) Morning, [12,18) Afternoon,
/// [18,24) Evening.
pub fn time_block(hour: u32) -> Option<&'static str> {
    match hour {
        0..6 => Some("Night"),
        6..12 => Some("Morning"),
        12..18 => Some("Afternoon"),
        18..24 => Some("Evening"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names_are_one_based() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn time_block_boundaries() {
        assert_eq!(time_block(0), Some("Night"));
        assert_eq!(time_block(5), Some("Night"));
        assert_eq!(time_block(6), Some("Morning"));
        assert_eq!(time_block(12), Some("Afternoon"));
        assert_eq!(time_block(23), Some("Evening"));
        assert_eq!(time_block(24), None);
    }

    #[test]
    fn canonical_orders_have_expected_lengths() {
        assert_eq!(CanonicalOrder::Months.values().len(), 12);
        assert_eq!(CanonicalOrder::Weekdays.values()[6], Value::from("Sunday"));
        assert_eq!(CanonicalOrder::Hours.values().len(), 24);
        assert_eq!(weekday_name(Weekday::Wed), "Wednesday");
    }
}

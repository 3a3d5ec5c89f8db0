//! Picking the table column that holds region names.

use std::collections::HashSet;

use tracing::debug;
use tvp_model::{ColumnType, Result, Table};

use crate::boundary::{Boundaries, normalize_region};

/// Minimum share of a column's distinct values that must be known regions.
pub const REGION_MATCH_SHARE: f64 = 0.5;
/// Distinct-value limit for the categorical fallback.
pub const FALLBACK_MAX_DISTINCT: usize = 50;
/// Columns preferred as the default location, in order.
pub const PREFERRED_LOCATION_COLUMNS: [&str; 2] = ["Registration_State", "Location"];

fn distinct_keys(table: &Table, column: &str) -> Result<HashSet<String>> {
    Ok(table
        .values(column)?
        .iter()
        .filter(|value| !value.is_null())
        .map(|value| normalize_region(&value.label()))
        .collect())
}

/// Text columns whose distinct values are mostly known regions. When none
/// qualify, text columns with fewer than [`FALLBACK_MAX_DISTINCT`] distinct
/// values.
pub fn find_location_columns(table: &Table, boundaries: &Boundaries) -> Result<Vec<String>> {
    let known: HashSet<&str> = boundaries.regions.iter().map(|r| r.key.as_str()).collect();
    let mut matching = Vec::new();
    let mut categorical = Vec::new();
    for field in table.schema().fields() {
        if field.ty != ColumnType::Text {
            continue;
        }
        let keys = distinct_keys(table, &field.name)?;
        if keys.is_empty() {
            continue;
        }
        let hits = keys.iter().filter(|key| known.contains(key.as_str())).count();
        if hits as f64 / keys.len() as f64 >= REGION_MATCH_SHARE {
            matching.push(field.name.clone());
        } else if keys.len() < FALLBACK_MAX_DISTINCT {
            categorical.push(field.name.clone());
        }
    }
    debug!(matching = matching.len(), fallback = categorical.len(), "location columns");
    Ok(if matching.is_empty() { categorical } else { matching })
}

/// Preferred column among `candidates`, else the first one.
pub fn default_location_column(candidates: &[String]) -> Option<&str> {
    PREFERRED_LOCATION_COLUMNS
        .iter()
        .find_map(|preferred| candidates.iter().find(|c| c.as_str() == *preferred))
        .or_else(|| candidates.first())
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::Region;
    use tvp_model::{ColumnData, Value};

    fn states() -> Boundaries {
        Boundaries {
            property: "ST_NM".to_string(),
            regions: ["Goa", "Kerala", "Punjab"]
                .iter()
                .map(|name| Region {
                    name: (*name).to_string(),
                    key: normalize_region(name),
                })
                .collect(),
        }
    }

    #[test]
    fn region_columns_win_over_categorical() {
        let table = Table::from_columns(vec![
            ColumnData::new(
                "Weather",
                ColumnType::Text,
                vec!["Fog".into(), "Rain".into(), "Fog".into()],
            ),
            ColumnData::new(
                "Registration_State",
                ColumnType::Text,
                vec!["goa".into(), "Kerala".into(), "Narnia".into()],
            ),
            ColumnData::new("Fine", ColumnType::Number, vec![1.0.into(), 2.0.into(), 3.0.into()]),
        ])
        .unwrap();
        let columns = find_location_columns(&table, &states()).unwrap();
        assert_eq!(columns, vec!["Registration_State".to_string()]);
    }

    #[test]
    fn falls_back_to_low_cardinality_text() {
        let table = Table::from_columns(vec![ColumnData::new(
            "Weather",
            ColumnType::Text,
            vec!["Fog".into(), Value::Null],
        )])
        .unwrap();
        assert_eq!(find_location_columns(&table, &states()).unwrap(), vec!["Weather".to_string()]);
    }

    #[test]
    fn prefers_known_location_names() {
        let candidates = vec!["City".to_string(), "Location".to_string()];
        assert_eq!(default_location_column(&candidates), Some("Location"));
        assert_eq!(default_location_column(&candidates[..1]), Some("City"));
        assert_eq!(default_location_column(&[]), None);
    }
}

//! Joining an aggregation result to region boundaries for map shading.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};
use tvp_model::{AnalysisError, ColumnData, ColumnType, Table, Value};

use crate::boundary::{Boundaries, normalize_region};
use crate::error::Result;

/// Shading of one region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionFill {
    Value(f64),
    /// No data row matched the region, or its value was null.
    NoData,
}

impl RegionFill {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(value) => Some(value),
            Self::NoData => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionValue {
    pub region: String,
    pub fill: RegionFill,
}

/// Every boundary region, in boundary order, with its fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethLayer {
    pub key_column: String,
    pub value_column: String,
    pub regions: Vec<RegionValue>,
    /// Data keys that match no region, as written in the data.
    pub unmatched: Vec<String>,
}

impl ChoroplethLayer {
    /// Smallest and largest filled value, for the colour scale.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.regions
            .iter()
            .filter_map(|region| region.fill.value())
            .fold(None, |range, value| match range {
                None => Some((value, value)),
                Some((low, high)) => Some((low.min(value), high.max(value))),
            })
    }

    pub fn matched(&self) -> usize {
        self.regions
            .iter()
            .filter(|region| region.fill != RegionFill::NoData)
            .count()
    }

    /// `Region`, value column and `Has_Data`, one row per region.
    pub fn to_table(&self) -> tvp_model::Result<Table> {
        Table::from_columns(vec![
            ColumnData::new(
                "Region",
                ColumnType::Text,
                self.regions.iter().map(|r| Value::from(r.region.as_str())).collect(),
            ),
            ColumnData::new(
                self.value_column.clone(),
                ColumnType::Number,
                self.regions.iter().map(|r| Value::from(r.fill.value())).collect(),
            ),
            ColumnData::new(
                "Has_Data",
                ColumnType::Boolean,
                self.regions
                    .iter()
                    .map(|r| Value::Boolean(r.fill != RegionFill::NoData))
                    .collect(),
            ),
        ])
    }
}

/// Joins `value_column` of `table` to `boundaries` on normalized
/// `key_column` labels.
///
/// Regions with no matching row are [`RegionFill::NoData`]; rows with a
/// null key are ignored. Two rows whose keys normalize to the same region
/// are a [`AnalysisError::DuplicateEntry`].
pub fn join_choropleth(
    table: &Table,
    key_column: &str,
    value_column: &str,
    boundaries: &Boundaries,
) -> Result<ChoroplethLayer> {
    table.column_type(key_column)?;
    table.require_numeric(value_column)?;
    let keys = table.values(key_column)?;
    let values = table.numbers(value_column)?;

    let mut by_key: HashMap<String, Option<f64>> = HashMap::with_capacity(keys.len());
    let mut data_order: Vec<(String, String)> = Vec::new();
    for (key, value) in keys.iter().zip(values) {
        if key.is_null() {
            continue;
        }
        let label = key.label();
        let normalized = normalize_region(&label);
        if by_key.insert(normalized.clone(), value).is_some() {
            return Err(AnalysisError::DuplicateEntry {
                key: label,
                context: format!("choropleth join on {key_column}"),
            }
            .into());
        }
        data_order.push((normalized, label));
    }

    let regions: Vec<RegionValue> = boundaries
        .regions
        .iter()
        .map(|region| RegionValue {
            region: region.name.clone(),
            fill: by_key
                .get(&region.key)
                .copied()
                .flatten()
                .map_or(RegionFill::NoData, RegionFill::Value),
        })
        .collect();

    let known: HashSet<&str> = boundaries.regions.iter().map(|r| r.key.as_str()).collect();
    let unmatched: Vec<String> = data_order
        .into_iter()
        .filter(|(normalized, _)| !known.contains(normalized.as_str()))
        .map(|(_, label)| label)
        .collect();
    if !unmatched.is_empty() {
        warn!(count = unmatched.len(), column = key_column, "data regions without boundary");
    }

    let layer = ChoroplethLayer {
        key_column: key_column.to_string(),
        value_column: value_column.to_string(),
        regions,
        unmatched,
    };
    debug!(regions = layer.regions.len(), matched = layer.matched(), "choropleth join");
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::Region;

    fn boundaries(names: &[&str]) -> Boundaries {
        Boundaries {
            property: "ST_NM".to_string(),
            regions: names
                .iter()
                .map(|name| Region {
                    name: (*name).to_string(),
                    key: normalize_region(name),
                })
                .collect(),
        }
    }

    fn counts(rows: &[(&str, Option<f64>)]) -> Table {
        Table::from_columns(vec![
            ColumnData::new(
                "Location",
                ColumnType::Text,
                rows.iter().map(|(name, _)| Value::from(*name)).collect(),
            ),
            ColumnData::new(
                "count",
                ColumnType::Number,
                rows.iter().map(|(_, value)| Value::from(*value)).collect(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn unmatched_regions_keep_no_data_fill() {
        let layer = join_choropleth(
            &counts(&[(" goa", Some(4.0)), ("Kerala", Some(9.0)), ("Atlantis", Some(1.0))]),
            "Location",
            "count",
            &boundaries(&["Goa", "Punjab", "KERALA"]),
        )
        .unwrap();
        assert_eq!(
            layer.regions,
            vec![
                RegionValue {
                    region: "Goa".to_string(),
                    fill: RegionFill::Value(4.0)
                },
                RegionValue {
                    region: "Punjab".to_string(),
                    fill: RegionFill::NoData
                },
                RegionValue {
                    region: "KERALA".to_string(),
                    fill: RegionFill::Value(9.0)
                },
            ]
        );
        assert_eq!(layer.unmatched, vec!["Atlantis".to_string()]);
        assert_eq!(layer.value_range(), Some((4.0, 9.0)));
        assert_eq!(layer.matched(), 2);
    }

    #[test]
    fn null_value_is_no_data() {
        let layer = join_choropleth(
            &counts(&[("Goa", None)]),
            "Location",
            "count",
            &boundaries(&["Goa"]),
        )
        .unwrap();
        assert_eq!(layer.regions[0].fill, RegionFill::NoData);
        assert_eq!(layer.value_range(), None);
        let table = layer.to_table().unwrap();
        assert_eq!(table.values("Has_Data").unwrap(), vec![Value::Boolean(false)]);
    }

    #[test]
    fn duplicate_normalized_keys_are_rejected() {
        let err = join_choropleth(
            &counts(&[("Goa", Some(1.0)), ("GOA ", Some(2.0))]),
            "Location",
            "count",
            &boundaries(&["Goa"]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::GeoError::Analysis(AnalysisError::DuplicateEntry { .. })
        ));
    }
}

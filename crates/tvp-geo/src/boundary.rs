//! Region boundaries read from a GeoJSON FeatureCollection.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::error::{GeoError, Result};

/// Properties tried, in order, when no name property is given.
pub const NAME_PROPERTIES: [&str; 5] = ["ST_NM", "NAME_1", "State_Name", "state", "name"];

/// Join key form of a region name: trimmed, internal whitespace collapsed,
/// lowercased.
pub fn normalize_region(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Name as it appears in the boundary file.
    pub name: String,
    /// [`normalize_region`] of the name.
    pub key: String,
}

/// Named regions in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundaries {
    pub property: String,
    pub regions: Vec<Region>,
}

impl Boundaries {
    /// Parses a FeatureCollection, naming regions by `property` or the first
    /// of [`NAME_PROPERTIES`] present on the first feature.
    pub fn from_geojson_str(content: &str, property: Option<&str>) -> Result<Self> {
        let collection: FeatureCollection = serde_json::from_str(content)?;
        let first = collection.features.first().ok_or(GeoError::NoFeatures)?;
        let property = match property {
            Some(property) => property.to_string(),
            None => NAME_PROPERTIES
                .iter()
                .find(|candidate| first.properties.contains_key(**candidate))
                .map(|candidate| (*candidate).to_string())
                .ok_or_else(|| GeoError::NoNameProperty {
                    tried: NAME_PROPERTIES.join(", "),
                })?,
        };
        let regions = collection
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| {
                feature
                    .properties
                    .get(&property)
                    .and_then(JsonValue::as_str)
                    .map(|name| Region {
                        name: name.to_string(),
                        key: normalize_region(name),
                    })
                    .ok_or_else(|| GeoError::MissingProperty {
                        property: property.clone(),
                        index,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { property, regions })
    }

    pub fn from_path(path: &Path, property: Option<&str>) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| GeoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let boundaries = Self::from_geojson_str(&content, property)?;
        info!(
            path = %path.display(),
            property = %boundaries.property,
            regions = boundaries.regions.len(),
            "loaded boundaries"
        );
        Ok(boundaries)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// True when `name` normalizes to a known region.
    pub fn contains(&self, name: &str) -> bool {
        let key = normalize_region(name);
        self.regions.iter().any(|region| region.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"ST_NM": "Maharashtra"}, "geometry": null},
            {"type": "Feature", "properties": {"ST_NM": "Tamil  Nadu"}, "geometry": null}
        ]
    }"#;

    #[test]
    fn normalizes_case_and_spacing() {
        assert_eq!(normalize_region("  Tamil   NADU "), "tamil nadu");
    }

    #[test]
    fn detects_name_property() {
        let boundaries = Boundaries::from_geojson_str(STATES, None).unwrap();
        assert_eq!(boundaries.property, "ST_NM");
        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries.regions[1].key, "tamil nadu");
        assert!(boundaries.contains("tamil nadu"));
    }

    #[test]
    fn explicit_property_must_exist() {
        let err = Boundaries::from_geojson_str(STATES, Some("NAME_1")).unwrap_err();
        assert!(matches!(err, GeoError::MissingProperty { index: 0, .. }));
    }

    #[test]
    fn empty_collection_is_rejected() {
        let err = Boundaries::from_geojson_str(r#"{"features": []}"#, None).unwrap_err();
        assert!(matches!(err, GeoError::NoFeatures));
    }
}

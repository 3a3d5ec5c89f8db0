//! Choropleth support: region boundaries, normalized-key joins with a
//! "no data" fill, and location-column detection.

pub mod boundary;
pub mod choropleth;
pub mod error;
pub mod locate;

pub use boundary::{Boundaries, NAME_PROPERTIES, Region, normalize_region};
pub use choropleth::{ChoroplethLayer, RegionFill, RegionValue, join_choropleth};
pub use error::{GeoError, Result};
pub use locate::{default_location_column, find_location_columns};

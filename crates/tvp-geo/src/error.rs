use std::path::PathBuf;

use thiserror::Error;
use tvp_model::AnalysisError;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("failed to read boundary file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON has no features")]
    NoFeatures,

    #[error("no region name property found (tried {tried})")]
    NoNameProperty { tried: String },

    #[error("feature {index} has no text property '{property}'")]
    MissingProperty { property: String, index: usize },

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

pub type Result<T> = std::result::Result<T, GeoError>;

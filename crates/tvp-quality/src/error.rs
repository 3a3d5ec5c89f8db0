use std::path::PathBuf;

use tvp_model::AnalysisError;

#[derive(Debug, thiserror::Error)]
pub enum QualityError {
    #[error("failed to read rules file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rules file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid quality rule: {message}")]
    InvalidRule { message: String },

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

pub type Result<T> = std::result::Result<T, QualityError>;

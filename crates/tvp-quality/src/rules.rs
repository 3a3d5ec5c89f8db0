//! Quality rule configuration, loadable from TOML.
//!
//! ```toml
//! outlier_columns = ["Recorded_Speed", "Fine_Amount"]
//!
//! [[domain]]
//! column = "Driver_Age"
//! rule = "range"
//! min = 16
//! max = 100
//!
//! [flags]
//! high_fine_quantile = 0.95
//! bad_weather = ["Fog", "Snow"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use tvp_model::Value;

use crate::error::{QualityError, Result};

/// Acceptable values of a column. Null is always acceptable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValueRule {
    /// Inclusive numeric range.
    Range { min: f64, max: f64 },
    AtLeast { min: f64 },
    AtMost { max: f64 },
    /// Case-insensitive set of labels.
    OneOf { values: Vec<String> },
}

impl ValueRule {
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match self {
            Self::Range { min, max } => value.as_f64().is_some_and(|v| v >= *min && v <= *max),
            Self::AtLeast { min } => value.as_f64().is_some_and(|v| v >= *min),
            Self::AtMost { max } => value.as_f64().is_some_and(|v| v <= *max),
            Self::OneOf { values } => {
                let label = value.label();
                values.iter().any(|allowed| allowed.trim().eq_ignore_ascii_case(label.trim()))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Range { min, max } => format!("within [{min}, {max}]"),
            Self::AtLeast { min } => format!(">= {min}"),
            Self::AtMost { max } => format!("<= {max}"),
            Self::OneOf { values } => format!("one of {}", values.join(", ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRule {
    pub column: String,
    #[serde(flatten)]
    pub rule: ValueRule,
}

impl DomainRule {
    pub fn new(column: impl Into<String>, rule: ValueRule) -> Self {
        Self {
            column: column.into(),
            rule,
        }
    }
}

/// Column names and thresholds of the rule-based flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagSettings {
    pub speed_column: String,
    pub speed_limit_column: String,
    pub fine_column: String,
    /// Fines strictly above this quantile are high.
    pub high_fine_quantile: f64,
    pub driver_column: String,
    /// Drivers with more violations than this are repeat offenders.
    pub repeat_offender_threshold: usize,
    pub weather_column: String,
    pub bad_weather: Vec<String>,
}

impl Default for FlagSettings {
    fn default() -> Self {
        Self {
            speed_column: "Recorded_Speed".to_string(),
            speed_limit_column: "Speed_Limit".to_string(),
            fine_column: "Fine_Amount".to_string(),
            high_fine_quantile: 0.90,
            driver_column: "Driver_ID".to_string(),
            repeat_offender_threshold: 2,
            weather_column: "Weather_Condition".to_string(),
            bad_weather: vec!["Fog".to_string(), "Rain".to_string(), "Snow".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityRules {
    pub outlier_columns: Vec<String>,
    pub domain: Vec<DomainRule>,
    pub flags: FlagSettings,
}

impl Default for QualityRules {
    fn default() -> Self {
        Self {
            outlier_columns: vec![
                "Recorded_Speed".to_string(),
                "Fine_Amount".to_string(),
                "Driver_Age".to_string(),
            ],
            domain: vec![
                DomainRule::new("Driver_Age", ValueRule::Range { min: 16.0, max: 100.0 }),
                DomainRule::new("Recorded_Speed", ValueRule::AtLeast { min: 0.0 }),
                DomainRule::new("Fine_Amount", ValueRule::AtLeast { min: 0.0 }),
            ],
            flags: FlagSettings::default(),
        }
    }
}

impl QualityRules {
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self> {
        let rules: Self = toml::from_str(content).map_err(|source| QualityError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| QualityError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rules = Self::from_toml_str(&content, path)?;
        info!(path = %path.display(), rules = rules.domain.len(), "loaded quality rules");
        Ok(rules)
    }

    fn validate(&self) -> Result<()> {
        for domain in &self.domain {
            if let ValueRule::Range { min, max } = domain.rule
                && min > max
            {
                return Err(QualityError::InvalidRule {
                    message: format!("range for {} has min {min} above max {max}", domain.column),
                });
            }
        }
        let quantile = self.flags.high_fine_quantile;
        if !(0.0..=1.0).contains(&quantile) {
            return Err(QualityError::InvalidRule {
                message: format!("high_fine_quantile {quantile} is outside [0, 1]"),
            });
        }
        Ok(())
    }
}

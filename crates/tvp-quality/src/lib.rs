//! Data-quality summarizer: completeness, duplicates, IQR outliers, domain
//! rule violations and rule-based risk flags.

pub mod error;
pub mod flags;
pub mod metrics;
pub mod rules;
pub mod summary;

pub use error::{QualityError, Result};
pub use flags::{FlagCount, flag_summary};
pub use metrics::{domain_violation_count, duplicate_rate, missing_rate, outlier_bounds, outlier_count};
pub use rules::{DomainRule, FlagSettings, QualityRules, ValueRule};
pub use summary::{ColumnOutliers, KeyMetrics, QualityReport, RuleViolations, key_metrics, summarize};

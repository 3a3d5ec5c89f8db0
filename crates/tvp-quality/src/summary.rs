//! Whole-table quality report and headline metrics.

use serde::Serialize;
use tracing::{debug, info};
use tvp_engine::stats::mean;
use tvp_engine::{Predicate, mode, percent};
use tvp_model::{Result, Table, Value};

use crate::flags::{FlagCount, flag_summary};
use crate::metrics::{domain_violation_count, duplicate_rate, missing_rate, outlier_bounds, outlier_count};
use crate::rules::QualityRules;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnOutliers {
    pub column: String,
    pub count: usize,
    /// IQR fences; absent when the column is missing or not numeric.
    pub bounds: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleViolations {
    pub column: String,
    pub rule: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub rows: usize,
    pub columns: usize,
    /// Percentage of null cells.
    pub missing_percent: f64,
    /// Percentage of rows repeating an earlier row.
    pub duplicate_percent: f64,
    pub outliers: Vec<ColumnOutliers>,
    pub violations: Vec<RuleViolations>,
    pub flags: Vec<FlagCount>,
}

/// Computes every configured metric.
pub fn summarize(table: &Table, rules: &QualityRules) -> Result<QualityReport> {
    let outliers = rules
        .outlier_columns
        .iter()
        .map(|column| ColumnOutliers {
            column: column.clone(),
            count: outlier_count(table, column),
            bounds: outlier_bounds(table, column),
        })
        .collect();

    let mut violations = Vec::with_capacity(rules.domain.len());
    for domain in &rules.domain {
        if !table.has_column(&domain.column) {
            debug!(column = %domain.column, "domain rule skipped, column absent");
        }
        violations.push(RuleViolations {
            column: domain.column.clone(),
            rule: domain.rule.describe(),
            count: domain_violation_count(table, &domain.column, |value| domain.rule.accepts(value))?,
        });
    }

    let report = QualityReport {
        rows: table.height(),
        columns: table.width(),
        missing_percent: missing_rate(table) * 100.0,
        duplicate_percent: duplicate_rate(table)? * 100.0,
        outliers,
        violations,
        flags: flag_summary(table, &rules.flags)?,
    };
    info!(
        rows = report.rows,
        missing = report.missing_percent,
        duplicates = report.duplicate_percent,
        "quality summary"
    );
    Ok(report)
}

/// Headline figures of the dataset overview. Each is `None` when its column
/// is absent or has no values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub total_violations: usize,
    pub most_common_violation: Option<String>,
    pub most_active_agency: Option<String>,
    pub average_fine: Option<f64>,
    pub max_fine: Option<f64>,
    pub min_fine: Option<f64>,
    pub helmet_percent: Option<f64>,
    pub seatbelt_percent: Option<f64>,
}

fn column_mode(table: &Table, column: &str) -> Result<Option<String>> {
    if !table.has_column(column) {
        return Ok(None);
    }
    Ok(mode(table, column)?.map(|value| value.label()))
}

/// Percentage of non-null values equal to "Yes".
fn yes_percent(table: &Table, column: &str) -> Result<Option<f64>> {
    if !table.has_column(column) {
        return Ok(None);
    }
    let answered = table.values(column)?.iter().filter(|value| !value.is_null()).count();
    if answered == 0 {
        return Ok(None);
    }
    let yes = Predicate::equals(column, "Yes")
        .mask(table)?
        .into_iter()
        .filter(|hit| *hit)
        .count();
    Ok(Some(percent(yes as f64, answered as f64)))
}

pub fn key_metrics(table: &Table) -> Result<KeyMetrics> {
    let fines: Vec<f64> = match table.numbers("Fine_Amount") {
        Ok(values) => values.into_iter().flatten().collect(),
        Err(_) => Vec::new(),
    };
    Ok(KeyMetrics {
        total_violations: table.height(),
        most_common_violation: column_mode(table, "Violation_Type")?,
        most_active_agency: column_mode(table, "Issuing_Agency")?,
        average_fine: mean(&fines),
        max_fine: fines.iter().copied().reduce(f64::max),
        min_fine: fines.iter().copied().reduce(f64::min),
        helmet_percent: yes_percent(table, "Helmet_Worn")?,
        seatbelt_percent: yes_percent(table, "Seatbelt_Worn")?,
    })
}

impl KeyMetrics {
    /// Label/value pairs for display; absent figures render as `N/A`.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "N/A".to_string());
        let number = |value: Option<f64>, suffix: &str| {
            value.map_or_else(|| "N/A".to_string(), |v| format!("{}{suffix}", Value::Number((v * 100.0).round() / 100.0).label()))
        };
        vec![
            ("Total Violations", self.total_violations.to_string()),
            ("Most Common Violation", text(&self.most_common_violation)),
            ("Most Active Agency", text(&self.most_active_agency)),
            ("Average Fine", number(self.average_fine, "")),
            ("Max Fine", number(self.max_fine, "")),
            ("Min Fine", number(self.min_fine, "")),
            ("Helmet Worn", number(self.helmet_percent, "%")),
            ("Seatbelt Worn", number(self.seatbelt_percent, "%")),
        ]
    }
}

//! Request boundary: one JSON-configurable description per chart or table,
//! executed against an immutable loaded table.
//!
//! Errors from a request abort only that request. Empty inputs and outputs
//! are reported as [`Warning::EmptyResult`] rather than errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn};
use tvp_model::{
    AnalysisError, Axis, CanonicalOrder, Matrix, Outcome, Result, Table, Value, Warning,
};

use crate::aggregate::{AggFunc, group_aggregate};
use crate::breakdown::{percentage_breakdown, percentage_matrix};
use crate::bucket::{TimeBucket, derive_time_bucket};
use crate::correlation::correlation_matrix;
use crate::counts::value_counts;
use crate::describe::describe;
use crate::filter::{filter_date_range, filter_rows};
use crate::pivot::{Normalize, crosstab, pivot, pivot_table};
use crate::predicate::Predicate;
use crate::present::Presentation;
use crate::reindex::ordered_reindex;

/// Inclusive calendar-day range on a datetime column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub column: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A derived time-bucket column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSpec {
    pub source: String,
    pub bucket: TimeBucket,
    #[serde(default)]
    pub target: Option<String>,
}

/// Row selection and derived columns applied before the analysis, in field
/// order: date range, buckets, then the row predicate (which may refer to
/// bucket columns).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preparation {
    pub date_range: Option<DateRange>,
    pub buckets: Vec<BucketSpec>,
    #[serde(rename = "where")]
    pub filter: Option<Predicate>,
}

fn zero() -> Value {
    Value::Number(0.0)
}

fn count_only() -> Vec<AggFunc> {
    vec![AggFunc::Count]
}

fn mean_func() -> AggFunc {
    AggFunc::Mean
}

/// The computation a request performs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Analysis {
    Group {
        group_by: Vec<String>,
        #[serde(default)]
        measures: Vec<String>,
        #[serde(default = "count_only")]
        functions: Vec<AggFunc>,
    },
    Pivot {
        index: String,
        columns: String,
        values: String,
        #[serde(default = "zero")]
        fill: Value,
    },
    PivotTable {
        index: String,
        columns: String,
        values: String,
        #[serde(default = "mean_func")]
        function: AggFunc,
        #[serde(default = "zero")]
        fill: Value,
    },
    Crosstab {
        index: String,
        columns: String,
        #[serde(default)]
        normalize: Normalize,
    },
    Breakdown {
        group_by: String,
        flag: Predicate,
    },
    /// Flag percentage per (index, columns) cell.
    Heatmap {
        index: String,
        columns: String,
        flag: Predicate,
    },
    ValueCounts {
        column: String,
    },
    /// Pearson matrix; every numeric column when `columns` is empty.
    Correlation {
        #[serde(default)]
        columns: Vec<String>,
    },
    Describe,
}

impl Analysis {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Group { .. } => "group",
            Self::Pivot { .. } => "pivot",
            Self::PivotTable { .. } => "pivot_table",
            Self::Crosstab { .. } => "crosstab",
            Self::Breakdown { .. } => "breakdown",
            Self::Heatmap { .. } => "heatmap",
            Self::ValueCounts { .. } => "value_counts",
            Self::Correlation { .. } => "correlation",
            Self::Describe => "describe",
        }
    }

    /// Input columns the analysis reads.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Group {
                group_by, measures, ..
            } => group_by.iter().chain(measures).map(String::as_str).collect(),
            Self::Pivot {
                index,
                columns,
                values,
                ..
            }
            | Self::PivotTable {
                index,
                columns,
                values,
                ..
            } => vec![index.as_str(), columns.as_str(), values.as_str()],
            Self::Crosstab { index, columns, .. } => vec![index.as_str(), columns.as_str()],
            Self::Breakdown { group_by, flag } => {
                let mut columns = vec![group_by.as_str()];
                columns.extend(flag.columns());
                columns
            }
            Self::Heatmap {
                index,
                columns,
                flag,
            } => {
                let mut names = vec![index.as_str(), columns.as_str()];
                names.extend(flag.columns());
                names
            }
            Self::ValueCounts { column } => vec![column.as_str()],
            Self::Correlation { columns } => columns.iter().map(String::as_str).collect(),
            Self::Describe => Vec::new(),
        }
    }

    /// Column a canonical order applies to when none is named.
    fn default_dimension(&self) -> Option<&str> {
        match self {
            Self::Group { group_by, .. } if group_by.len() == 1 => Some(&group_by[0]),
            Self::Breakdown { group_by, .. } => Some(group_by),
            Self::ValueCounts { column } => Some(column),
            _ => None,
        }
    }
}

/// Category list for an ordered reindex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Categories {
    Named(CanonicalOrder),
    Explicit(Vec<Value>),
}

impl Categories {
    pub fn values(&self) -> Vec<Value> {
        match self {
            Self::Named(order) => order.values(),
            Self::Explicit(values) => values.clone(),
        }
    }
}

/// Fixed ordering of result categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    /// Table column to order; defaults to the analysis' single dimension.
    #[serde(default)]
    pub dimension: Option<String>,
    /// Matrix axis to order; defaults to rows.
    #[serde(default)]
    pub axis: Option<Axis>,
    pub categories: Categories,
    #[serde(default = "zero")]
    pub fill: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub prepare: Preparation,
    pub analysis: Analysis,
    #[serde(default)]
    pub order: Option<OrderSpec>,
    #[serde(default)]
    pub present: Presentation,
}

impl AnalysisRequest {
    pub fn new(analysis: Analysis) -> Self {
        Self {
            prepare: Preparation::default(),
            analysis,
            order: None,
            present: Presentation::default(),
        }
    }
}

/// Result payload handed to a renderer.
#[derive(Debug, Clone)]
pub enum Output {
    Table(Table),
    Matrix(Matrix),
    /// Nothing to render; a [`Warning::EmptyResult`] says why.
    Empty,
}

impl Output {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Table(table) => table.is_empty(),
            Self::Matrix(matrix) => {
                let (rows, columns) = matrix.shape();
                rows == 0 || columns == 0
            }
            Self::Empty => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisResponse {
    pub output: Output,
    pub warnings: Vec<Warning>,
}

/// Applies a request's preparation steps.
pub fn prepare(table: &Table, preparation: &Preparation) -> Result<Outcome<Table>> {
    let mut current = table.clone();
    let mut warnings = Vec::new();
    if let Some(range) = &preparation.date_range {
        current = filter_date_range(&current, &range.column, range.start, range.end)?;
    }
    for derivation in &preparation.buckets {
        let (derived, bucket_warnings) =
            derive_time_bucket(&current, &derivation.source, derivation.bucket, derivation.target.as_deref())?
                .into_parts();
        current = derived;
        warnings.extend(bucket_warnings);
    }
    if let Some(predicate) = &preparation.filter {
        current = filter_rows(&current, predicate)?;
    }
    Ok(Outcome::with_warnings(current, warnings))
}

fn run_analysis(table: &Table, analysis: &Analysis) -> Result<Output> {
    let output = match analysis {
        Analysis::Group {
            group_by,
            measures,
            functions,
        } => Output::Table(group_aggregate(
            table,
            group_by.as_slice(),
            measures.as_slice(),
            functions,
        )?),
        Analysis::Pivot {
            index,
            columns,
            values,
            fill,
        } => Output::Matrix(pivot(table, index, columns, values, fill)?),
        Analysis::PivotTable {
            index,
            columns,
            values,
            function,
            fill,
        } => Output::Matrix(pivot_table(table, index, columns, values, *function, fill)?),
        Analysis::Crosstab {
            index,
            columns,
            normalize,
        } => Output::Matrix(crosstab(table, index, columns, *normalize)?),
        Analysis::Breakdown { group_by, flag } => {
            Output::Table(percentage_breakdown(table, group_by, flag)?)
        }
        Analysis::Heatmap {
            index,
            columns,
            flag,
        } => Output::Matrix(percentage_matrix(table, index, columns, flag)?.percent),
        Analysis::ValueCounts { column } => Output::Table(value_counts(table, column)?),
        Analysis::Correlation { columns } => Output::Matrix(correlation_matrix(table, columns)?),
        Analysis::Describe => Output::Table(describe(table)?),
    };
    Ok(output)
}

fn apply_order(output: Output, analysis: &Analysis, order: &OrderSpec) -> Result<Output> {
    let categories = order.categories.values();
    match output {
        Output::Table(table) => {
            let dimension = order
                .dimension
                .as_deref()
                .or_else(|| analysis.default_dimension())
                .ok_or_else(|| {
                    AnalysisError::invalid_request(format!(
                        "ordering a {} result needs a dimension column",
                        analysis.kind()
                    ))
                })?;
            Ok(Output::Table(ordered_reindex(&table, dimension, &categories, &order.fill)?))
        }
        Output::Matrix(matrix) => Ok(Output::Matrix(matrix.reindex(
            order.axis.unwrap_or(Axis::Rows),
            &categories,
            &order.fill,
        ))),
        Output::Empty => Ok(Output::Empty),
    }
}

fn empty(stage: &str, mut warnings: Vec<Warning>) -> AnalysisResponse {
    warn!(stage, "empty result");
    warnings.push(Warning::EmptyResult {
        stage: stage.to_string(),
    });
    AnalysisResponse {
        output: Output::Empty,
        warnings,
    }
}

/// Runs one request: prepare, analyse, order, present.
pub fn execute(table: &Table, request: &AnalysisRequest) -> Result<AnalysisResponse> {
    let kind = request.analysis.kind();
    let _span = info_span!("analysis", kind).entered();

    let (prepared, warnings) = prepare(table, &request.prepare)?.into_parts();
    prepared.require_columns(&request.analysis.columns())?;
    if prepared.is_empty() {
        return Ok(empty("filtering", warnings));
    }

    let mut output = run_analysis(&prepared, &request.analysis)?;
    if let Some(order) = &request.order {
        output = apply_order(output, &request.analysis, order)?;
    }
    output = match output {
        Output::Table(table) => Output::Table(request.present.apply(&table)?),
        other => other,
    };
    if output.is_empty() {
        return Ok(empty(kind, warnings));
    }
    debug!(rows = prepared.height(), warnings = warnings.len(), "analysis complete");
    Ok(AnalysisResponse { output, warnings })
}

/// Runs independent requests; a failing request does not affect the others.
pub fn execute_batch(table: &Table, requests: &[AnalysisRequest]) -> Vec<Result<AnalysisResponse>> {
    requests
        .iter()
        .map(|request| {
            let result = execute(table, request);
            if let Err(error) = &result {
                warn!(kind = request.analysis.kind(), %error, "request failed");
            }
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_with_defaults() {
        let request: AnalysisRequest = serde_json::from_str(
            r#"{
                "prepare": {
                    "buckets": [{"source": "Date", "bucket": "month"}],
                    "where": {"op": "equals", "column": "Helmet_Worn", "value": "No"}
                },
                "analysis": {"kind": "group", "group_by": ["Month"]},
                "order": {"categories": "months"}
            }"#,
        )
        .unwrap();
        assert_eq!(
            request.analysis,
            Analysis::Group {
                group_by: vec!["Month".to_string()],
                measures: vec![],
                functions: vec![AggFunc::Count],
            }
        );
        let order = request.order.unwrap();
        assert_eq!(order.categories, Categories::Named(CanonicalOrder::Months));
        assert_eq!(order.fill, Value::Number(0.0));
        assert_eq!(request.prepare.buckets[0].bucket, TimeBucket::Month);
        assert!(request.present.sort_by.is_none());
    }

    #[test]
    fn explicit_categories() {
        let order: OrderSpec = serde_json::from_str(
            r#"{"dimension": "Weather", "categories": ["Clear", "Rain"], "fill": null}"#,
        )
        .unwrap();
        assert_eq!(
            order.categories.values(),
            vec![Value::from("Clear"), Value::from("Rain")]
        );
        assert_eq!(order.fill, Value::Null);
    }
}

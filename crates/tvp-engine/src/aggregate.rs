//! Grouped aggregation.

use std::fmt;
use std::str::FromStr;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tvp_model::{AnalysisError, ColumnData, ColumnType, Result, Table, Value};

/// Column name used for group sizes when no measure column is given.
pub const COUNT_COLUMN: &str = "count";

/// Aggregation function applied to a measure column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFunc {
    /// Number of non-null values.
    Count,
    Sum,
    Mean,
    Median,
    Min,
    Max,
    /// Sample standard deviation.
    Std,
}

impl AggFunc {
    pub const ALL: [AggFunc; 7] = [
        Self::Count,
        Self::Sum,
        Self::Mean,
        Self::Median,
        Self::Min,
        Self::Max,
        Self::Std,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
            Self::Std => "std",
        }
    }

    /// Everything except `Count` needs a numeric measure.
    pub fn requires_numeric(self) -> bool {
        self != Self::Count
    }

    /// Output column name, `measure_func`.
    pub fn output_name(self, measure: &str) -> String {
        format!("{measure}_{}", self.as_str())
    }

    fn expr(self, measure: &str) -> Expr {
        let values = col(measure).cast(DataType::Float64);
        match self {
            Self::Count => col(measure).count().cast(DataType::Int64),
            Self::Sum => values.sum(),
            Self::Mean => values.mean(),
            Self::Median => values.median(),
            Self::Min => values.min(),
            Self::Max => values.max(),
            Self::Std => values.std(1),
        }
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggFunc {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" => Ok(Self::Count),
            "sum" | "total" => Ok(Self::Sum),
            "mean" | "avg" | "average" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "std" | "stddev" => Ok(Self::Std),
            other => Err(format!("unknown aggregation function '{other}'")),
        }
    }
}

/// Groups `table` by `group_cols` and aggregates each measure with each
/// function.
///
/// Output has one row per distinct key combination in first-appearance
/// order: the group columns followed by `measure_func` columns. Rows with a
/// null in any group column are excluded. An aggregate over a group with no
/// non-null measure values is null, including `sum`. With no measure
/// columns only `count` is accepted and yields the group size in a `count`
/// column.
pub fn group_aggregate<G, M>(
    table: &Table,
    group_cols: &[G],
    measure_cols: &[M],
    funcs: &[AggFunc],
) -> Result<Table>
where
    G: AsRef<str>,
    M: AsRef<str>,
{
    if group_cols.is_empty() {
        return Err(AnalysisError::invalid_request(
            "at least one grouping column is required",
        ));
    }
    if funcs.is_empty() {
        return Err(AnalysisError::invalid_request(
            "at least one aggregation function is required",
        ));
    }
    table.require_columns(group_cols)?;
    table.require_columns(measure_cols)?;
    for measure in measure_cols {
        if funcs.iter().any(|func| func.requires_numeric()) {
            table.require_numeric(measure.as_ref())?;
        }
    }

    let keys: Vec<Expr> = group_cols.iter().map(|name| col(name.as_ref())).collect();
    let mut outputs: Vec<String> = group_cols.iter().map(|g| g.as_ref().to_string()).collect();
    let mut aggs: Vec<Expr> = Vec::new();
    // (sum column, helper count column) pairs nulled out for empty groups.
    let mut sums: Vec<(String, String)> = Vec::new();

    if measure_cols.is_empty() {
        if funcs.iter().any(|func| *func != AggFunc::Count) {
            return Err(AnalysisError::invalid_request(
                "functions other than count need a measure column",
            ));
        }
        aggs.push(len().cast(DataType::Int64).alias(COUNT_COLUMN));
        outputs.push(COUNT_COLUMN.to_string());
    }
    for measure in measure_cols {
        let measure = measure.as_ref();
        for func in funcs {
            let name = func.output_name(measure);
            if outputs.contains(&name) {
                continue;
            }
            aggs.push(func.expr(measure).alias(name.as_str()));
            if *func == AggFunc::Sum {
                let helper = format!("__valid_{name}");
                aggs.push(col(measure).count().alias(helper.as_str()));
                sums.push((name.clone(), helper));
            }
            outputs.push(name);
        }
    }

    let mut frame = table.frame().clone().lazy();
    if let Some(non_null) = group_cols
        .iter()
        .map(|name| col(name.as_ref()).is_not_null())
        .reduce(|acc, next| acc.and(next))
    {
        frame = frame.filter(non_null);
    }
    let grouped = frame.group_by_stable(keys).agg(aggs).collect()?;
    let mut result = Table::new(grouped)?;

    for (name, helper) in &sums {
        let totals = result.numbers(name)?;
        let valid = result.numbers(helper)?;
        let values = totals
            .iter()
            .zip(&valid)
            .map(|(total, valid)| match valid {
                Some(count) if *count > 0.0 => Value::from(*total),
                _ => Value::Null,
            })
            .collect();
        result = result.with_column(&ColumnData::new(name.clone(), ColumnType::Number, values))?;
    }

    let result = result.select(&outputs)?;
    debug!(
        groups = result.height(),
        rows = table.height(),
        "grouped aggregate"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fines() -> Table {
        Table::from_columns(vec![
            ColumnData::new(
                "Violation_Type",
                ColumnType::Text,
                vec![
                    "Speeding".into(),
                    "Speeding".into(),
                    "Parking".into(),
                    "Helmet".into(),
                    Value::Null,
                ],
            ),
            ColumnData::new(
                "Fine_Amount",
                ColumnType::Number,
                vec![
                    500.0.into(),
                    700.0.into(),
                    200.0.into(),
                    Value::Null,
                    900.0.into(),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn mean_in_first_appearance_order() {
        let result = group_aggregate(&fines(), &["Violation_Type"], &["Fine_Amount"], &[AggFunc::Mean])
            .unwrap();
        assert_eq!(result.column_names(), vec!["Violation_Type", "Fine_Amount_mean"]);
        assert_eq!(
            result.values("Violation_Type").unwrap(),
            vec![Value::from("Speeding"), Value::from("Parking"), Value::from("Helmet")]
        );
        assert_eq!(
            result.numbers("Fine_Amount_mean").unwrap(),
            vec![Some(600.0), Some(200.0), None]
        );
    }

    #[test]
    fn sum_of_group_without_values_is_null() {
        let result = group_aggregate(
            &fines(),
            &["Violation_Type"],
            &["Fine_Amount"],
            &[AggFunc::Sum, AggFunc::Count],
        )
        .unwrap();
        assert_eq!(
            result.column_names(),
            vec!["Violation_Type", "Fine_Amount_sum", "Fine_Amount_count"]
        );
        assert_eq!(
            result.numbers("Fine_Amount_sum").unwrap(),
            vec![Some(1200.0), Some(200.0), None]
        );
        assert_eq!(
            result.numbers("Fine_Amount_count").unwrap(),
            vec![Some(2.0), Some(1.0), Some(0.0)]
        );
    }

    #[test]
    fn count_without_measures_gives_group_sizes() {
        let result = group_aggregate::<_, &str>(&fines(), &["Violation_Type"], &[], &[AggFunc::Count])
            .unwrap();
        assert_eq!(result.column_names(), vec!["Violation_Type", COUNT_COLUMN]);
        assert_eq!(
            result.numbers(COUNT_COLUMN).unwrap(),
            vec![Some(2.0), Some(1.0), Some(1.0)]
        );
    }

    #[test]
    fn std_and_extremes() {
        let result = group_aggregate(
            &fines(),
            &["Violation_Type"],
            &["Fine_Amount"],
            &[AggFunc::Min, AggFunc::Max, AggFunc::Std],
        )
        .unwrap();
        assert_eq!(
            result.numbers("Fine_Amount_min").unwrap(),
            vec![Some(500.0), Some(200.0), None]
        );
        assert_eq!(
            result.numbers("Fine_Amount_max").unwrap(),
            vec![Some(700.0), Some(200.0), None]
        );
        let std = result.numbers("Fine_Amount_std").unwrap();
        assert!((std[0].unwrap() - 141.421_356).abs() < 1e-4);
        assert_eq!(std[1], None);
    }

    #[test]
    fn missing_column_is_schema_error() {
        let err = group_aggregate(&fines(), &["Location"], &["Fine_Amount"], &[AggFunc::Mean])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Schema { column } if column == "Location"));
    }

    #[test]
    fn numeric_function_on_text_is_type_mismatch() {
        let err = group_aggregate(&fines(), &["Fine_Amount"], &["Violation_Type"], &[AggFunc::Mean])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::TypeMismatch { .. }));
        assert!(
            group_aggregate(&fines(), &["Fine_Amount"], &["Violation_Type"], &[AggFunc::Count])
                .is_ok()
        );
    }

    #[test]
    fn parses_function_names() {
        assert_eq!("avg".parse::<AggFunc>(), Ok(AggFunc::Mean));
        assert_eq!("STD".parse::<AggFunc>(), Ok(AggFunc::Std));
        assert!("mode".parse::<AggFunc>().is_err());
    }
}

//! Dataset loading and the small argument grammars used on the command line.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::debug;
use tvp_engine::{BucketSpec, CompareOp, DateRange, Predicate, TimeBucket};
use tvp_ingest::{IngestOptions, read_csv_table};
use tvp_model::{ColumnType, Outcome, Table, Value};

/// Parses `COLUMN=TYPE`, e.g. `Fine_Amount=number`.
pub fn parse_declaration(raw: &str) -> std::result::Result<(String, ColumnType), String> {
    let (column, ty) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=TYPE, got '{raw}'"))?;
    let ty: ColumnType = ty.parse()?;
    Ok((column.trim().to_string(), ty))
}

/// Parses a snake_case name through the type's serde representation.
pub fn parse_named<T: DeserializeOwned>(raw: &str) -> std::result::Result<T, String> {
    let name = raw.trim().to_ascii_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(name)).map_err(|err| err.to_string())
}

/// Parses `SOURCE=BUCKET[:TARGET]`, e.g. `Date=month` or
/// `Time=time_block:Block`.
pub fn parse_derivation(raw: &str) -> std::result::Result<BucketSpec, String> {
    let (source, rest) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SOURCE=BUCKET[:TARGET], got '{raw}'"))?;
    let (bucket, target) = match rest.split_once(':') {
        Some((bucket, target)) => (bucket, Some(target.trim().to_string())),
        None => (rest, None),
    };
    Ok(BucketSpec {
        source: source.trim().to_string(),
        bucket: parse_named::<TimeBucket>(bucket)?,
        target,
    })
}

const OPERATORS: [(&str, Option<CompareOp>); 6] = [
    (">=", Some(CompareOp::Ge)),
    ("<=", Some(CompareOp::Le)),
    ("!=", None),
    (">", Some(CompareOp::Gt)),
    ("<", Some(CompareOp::Lt)),
    ("=", None),
];

/// Parses a row condition.
///
/// - `COLUMN=A,B` matches any listed value, `COLUMN!=A,B` none of them
/// - `COLUMN>80` (also `>=`, `<`, `<=`) compares with a number
/// - `COLUMN>OTHER` compares two numeric columns
pub fn parse_flag(raw: &str) -> std::result::Result<Predicate, String> {
    let (symbol, op, position) = OPERATORS
        .iter()
        .find_map(|(symbol, op)| raw.find(symbol).map(|position| (*symbol, *op, position)))
        .ok_or_else(|| format!("no operator in condition '{raw}'"))?;
    let column = raw[..position].trim();
    let operand = raw[position + symbol.len()..].trim();
    if column.is_empty() || operand.is_empty() {
        return Err(format!("incomplete condition '{raw}'"));
    }
    let predicate = match op {
        Some(op) => match operand.parse::<f64>() {
            Ok(number) => Predicate::compare(column, op, number),
            Err(_) => Predicate::compare_columns(column, op, operand),
        },
        None => {
            let listed = Predicate::one_of(column, operand.split(',').map(str::trim));
            if symbol == "!=" { listed.negate() } else { listed }
        }
    };
    Ok(predicate)
}

pub fn ingest_options(declared: &[(String, ColumnType)]) -> IngestOptions {
    declared
        .iter()
        .fold(IngestOptions::default(), |options, (column, ty)| {
            options.declare(column.clone(), *ty)
        })
}

/// Loads a CSV dataset, attaching the path to any error.
pub fn load_dataset(path: &Path, options: &IngestOptions) -> Result<Outcome<Table>> {
    read_csv_table(path, options).with_context(|| format!("failed to load {}", path.display()))
}

/// Inclusive date range on `column`. A missing bound is taken from the
/// data; without bounds there is no range.
pub fn date_range(
    table: &Table,
    column: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Option<DateRange>> {
    if from.is_none() && to.is_none() {
        return Ok(None);
    }
    let Some(column) = column else {
        bail!("--from/--to need --date-column");
    };
    let dates: Vec<NaiveDate> = table
        .values(column)?
        .iter()
        .filter_map(Value::as_datetime)
        .map(|datetime| datetime.date())
        .collect();
    let start = from.or_else(|| dates.iter().min().copied());
    let end = to.or_else(|| dates.iter().max().copied());
    let (Some(start), Some(end)) = (start, end) else {
        bail!("column '{column}' has no dates to bound the range");
    };
    debug!(column, %start, %end, "date range");
    Ok(Some(DateRange {
        column: column.to_string(),
        start,
        end,
    }))
}

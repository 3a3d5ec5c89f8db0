//! CLI argument definitions for `tvp`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tvp_cli::dataset::{parse_declaration, parse_derivation, parse_flag, parse_named};
use tvp_engine::{AggFunc, BucketSpec, Predicate};
use tvp_model::{CanonicalOrder, ColumnType};

#[derive(Parser)]
#[command(
    name = "tvp",
    version,
    about = "Traffic violation analysis - group, pivot and profile violation records",
    long_about = "Load a traffic violation CSV and produce grouped counts, pivots,\n\
                  percentage breakdowns, data-quality summaries and choropleth inputs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List columns with their types and a statistical profile.
    Columns(ColumnsArgs),

    /// Data-quality summary, rule-based flags and headline metrics.
    Quality(QualityArgs),

    /// Group rows and aggregate measures.
    Group(GroupArgs),

    /// Pivot, aggregate-pivot or cross-tabulate two columns.
    Pivot(PivotArgs),

    /// Share of rows matching a condition per group.
    Breakdown(BreakdownArgs),

    /// Most frequent values of one column.
    Counts(CountsArgs),

    /// Pearson correlation between numeric columns.
    Corr(CorrArgs),

    /// Execute analysis requests from a JSON file.
    Run(RunArgs),

    /// Join per-region values to GeoJSON boundaries.
    Map(MapArgs),
}

#[derive(Args)]
pub struct DataArgs {
    /// Violation records in CSV form.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Fix a column's type instead of inferring it (COLUMN=TYPE).
    #[arg(long = "declare", value_name = "COLUMN=TYPE", value_parser = parse_declaration)]
    pub declare: Vec<(String, ColumnType)>,

    /// Date column used by --from/--to.
    #[arg(long = "date-column", value_name = "COLUMN")]
    pub date_column: Option<String>,

    /// First calendar date to keep (YYYY-MM-DD).
    #[arg(long = "from", value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last calendar date to keep (YYYY-MM-DD).
    #[arg(long = "to", value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Keep only rows matching a condition (COLUMN=A,B / COLUMN>N / A>B).
    #[arg(long = "where", value_name = "CONDITION", value_parser = parse_flag)]
    pub filter: Vec<Predicate>,

    /// Derive a calendar or clock column (SOURCE=BUCKET[:TARGET]).
    #[arg(long = "derive", value_name = "SOURCE=BUCKET", value_parser = parse_derivation)]
    pub derive: Vec<BucketSpec>,
}

#[derive(Args)]
pub struct OutputArgs {
    /// Also write the result to a CSV file.
    #[arg(long = "csv", value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Print JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct PresentArgs {
    /// Canonical category order for the result rows.
    #[arg(long = "order", value_name = "ORDER", value_parser = parse_named::<CanonicalOrder>)]
    pub order: Option<CanonicalOrder>,

    /// Sort result rows by a column.
    #[arg(long = "sort", value_name = "COLUMN")]
    pub sort: Option<String>,

    /// Sort descending.
    #[arg(long = "desc", requires = "sort")]
    pub descending: bool,

    /// Keep only the first N rows.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct QualityArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Quality rules TOML file (built-in defaults otherwise).
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct GroupArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Group columns.
    #[arg(long = "by", value_name = "COLUMN", value_delimiter = ',', required = true)]
    pub by: Vec<String>,

    /// Measure columns.
    #[arg(long = "measure", value_name = "COLUMN", value_delimiter = ',')]
    pub measures: Vec<String>,

    /// Aggregation functions (count, sum, mean, median, min, max, std).
    #[arg(long = "func", value_name = "FUNC", value_delimiter = ',', default_value = "count")]
    pub functions: Vec<AggFunc>,

    #[command(flatten)]
    pub present: PresentArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct PivotArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Row key column.
    #[arg(long = "index", value_name = "COLUMN")]
    pub index: String,

    /// Column key column.
    #[arg(long = "columns", value_name = "COLUMN")]
    pub columns: String,

    /// Value column; without it the cells are counts.
    #[arg(long = "values", value_name = "COLUMN")]
    pub values: Option<String>,

    /// Aggregate duplicate cells with this function.
    #[arg(long = "func", value_name = "FUNC", requires = "values")]
    pub function: Option<AggFunc>,

    /// Express counts as percentages of each row total.
    #[arg(long = "normalize", conflicts_with = "values")]
    pub normalize: bool,

    /// Canonical order for the matrix rows.
    #[arg(long = "order", value_name = "ORDER", value_parser = parse_named::<CanonicalOrder>)]
    pub order: Option<CanonicalOrder>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct BreakdownArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Group column.
    #[arg(long = "by", value_name = "COLUMN")]
    pub by: String,

    /// Condition counted per group (COLUMN=A,B / COLUMN>N / A>B).
    #[arg(long = "flag", value_name = "CONDITION", value_parser = parse_flag)]
    pub flag: Predicate,

    /// Second dimension: produce a percentage heatmap instead of a table.
    #[arg(long = "columns", value_name = "COLUMN")]
    pub columns: Option<String>,

    #[command(flatten)]
    pub present: PresentArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct CountsArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Column to count.
    #[arg(long = "column", value_name = "COLUMN")]
    pub column: String,

    /// Keep only the N most frequent values.
    #[arg(long = "top", value_name = "N")]
    pub top: Option<usize>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct CorrArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Columns to correlate [default: every numeric column].
    #[arg(long = "columns", value_name = "COLUMN", value_delimiter = ',')]
    pub columns: Vec<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// JSON file holding one request or an array of requests.
    #[arg(long = "request", value_name = "PATH")]
    pub request: PathBuf,

    /// Print JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct MapArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// GeoJSON FeatureCollection with region boundaries.
    #[arg(long = "boundaries", value_name = "PATH")]
    pub boundaries: PathBuf,

    /// Feature property holding region names (detected otherwise).
    #[arg(long = "property", value_name = "NAME")]
    pub property: Option<String>,

    /// Data column holding region names (detected otherwise).
    #[arg(long = "location", value_name = "COLUMN")]
    pub location: Option<String>,

    /// Numeric column to aggregate per region; counts rows otherwise.
    #[arg(long = "value", value_name = "COLUMN")]
    pub value: Option<String>,

    /// Aggregation for --value.
    #[arg(long = "func", value_enum, default_value = "mean", requires = "value")]
    pub function: MapFuncArg,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Per-region aggregations offered for maps.
#[derive(Clone, Copy, ValueEnum)]
pub enum MapFuncArg {
    Mean,
    Sum,
    Median,
}

impl From<MapFuncArg> for AggFunc {
    fn from(value: MapFuncArg) -> Self {
        match value {
            MapFuncArg::Mean => Self::Mean,
            MapFuncArg::Sum => Self::Sum,
            MapFuncArg::Median => Self::Median,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

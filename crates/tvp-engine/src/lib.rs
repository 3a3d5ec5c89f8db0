//! Aggregation engine for traffic violation tables.
//!
//! Every operation takes an immutable [`Table`](tvp_model::Table) and
//! returns a new table or [`Matrix`](tvp_model::Matrix); nothing is
//! mutated in place. The [`request`] module is the single configurable
//! entry point used by the CLI and any other front end.

pub mod aggregate;
pub mod breakdown;
pub mod bucket;
pub mod coerce;
pub mod correlation;
pub mod counts;
pub mod describe;
pub mod filter;
pub mod pivot;
pub mod predicate;
pub mod present;
pub mod reindex;
pub mod request;
pub mod stats;

pub use aggregate::{AggFunc, COUNT_COLUMN, group_aggregate};
pub use breakdown::{PercentageMatrix, percentage_breakdown, percentage_matrix};
pub use bucket::{TimeBucket, derive_time_bucket};
pub use coerce::coerce_table_column;
pub use correlation::{correlation, correlation_matrix};
pub use counts::{mode, top_n, value_counts};
pub use describe::describe;
pub use filter::{filter_date_range, filter_in, filter_rows};
pub use pivot::{Normalize, crosstab, percent, pivot, pivot_table};
pub use predicate::{CompareOp, Predicate};
pub use present::{Presentation, head, sort_table};
pub use reindex::ordered_reindex;
pub use request::{
    Analysis, AnalysisRequest, AnalysisResponse, BucketSpec, Categories, DateRange, OrderSpec,
    Output, Preparation, execute, execute_batch, prepare,
};

//! Core data model for traffic violation analysis.
//!
//! A [`Table`] is an immutable, schema-typed wrapper around a Polars
//! `DataFrame`. Every derived view is a new `Table`; nothing here mutates a
//! table that another consumer can observe.

pub mod calendar;
pub mod coerce;
pub mod error;
pub mod matrix;
pub mod outcome;
pub mod schema;
pub mod table;
pub mod value;

pub use calendar::CanonicalOrder;
pub use coerce::coerce_column;
pub use error::{AnalysisError, Result};
pub use matrix::{Axis, Matrix};
pub use outcome::{Outcome, Warning};
pub use schema::{Field, Schema};
pub use table::{ColumnData, Record, Table};
pub use value::{ColumnType, Value};

//! Shared utilities for the traffic violation analysis workspace.
//!
//! This crate provides Polars `AnyValue` helpers and the raw-string coercion
//! functions used both at load time and when the engine parses text columns.

pub mod coerce;
pub mod polars;

pub use coerce::{is_boolean_token, parse_boolean, parse_datetime, parse_number, parse_time};
pub use polars::{any_to_datetime, any_to_f64, any_to_string, format_numeric, parse_f64};

//! Export of analysis results.
//!
//! CSV output round-trips through the loader when the same column types are
//! declared; JSON output is shaped for rendering collaborators.

pub mod csv_export;
pub mod error;
pub mod json_export;

pub use csv_export::{
    table_csv_string, write_matrix_csv, write_matrix_csv_file, write_table_csv,
    write_table_csv_file,
};
pub use error::{ReportError, Result};
pub use json_export::{matrix_to_json, table_to_json};

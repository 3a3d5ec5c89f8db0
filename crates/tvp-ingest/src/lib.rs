//! Dataset loading for traffic violation analysis.
//!
//! Reads a delimited text file into a typed [`tvp_model::Table`]. Column
//! types are fixed once here, either from declarations or by inference, and
//! every cell is coerced explicitly. Cells that fail coercion become null and
//! are reported as warnings on the returned [`tvp_model::Outcome`].

pub mod error;
pub mod infer;
pub mod loader;
pub mod options;
pub mod reader;

pub use error::{IngestError, Result};
pub use infer::infer_column_type;
pub use loader::{build_table, read_csv_reader, read_csv_table};
pub use options::IngestOptions;
pub use reader::{RawTable, read_raw_csv, read_raw_csv_verbatim};

//! Typed table construction from raw delimited text.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, info, info_span, warn};
use tvp_model::{Outcome, Table, coerce_column};

use crate::error::{IngestError, Result};
use crate::infer::infer_column_type;
use crate::options::IngestOptions;
use crate::reader::{RawTable, read_raw_csv, read_raw_csv_verbatim};

/// Loads a CSV file into a typed table.
pub fn read_csv_table(path: &Path, options: &IngestOptions) -> Result<Outcome<Table>> {
    let span = info_span!("load_csv", path = %path.display());
    let _guard = span.enter();
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = read_raw(BufReader::new(file), options)?;
    build_table(&raw, options)
}

/// Loads CSV text from any reader (uploads, tests).
pub fn read_csv_reader<R: Read>(input: R, options: &IngestOptions) -> Result<Outcome<Table>> {
    let raw = read_raw(input, options)?;
    build_table(&raw, options)
}

fn read_raw<R: Read>(input: R, options: &IngestOptions) -> Result<RawTable> {
    if options.verbatim {
        read_raw_csv_verbatim(input)
    } else {
        read_raw_csv(input)
    }
}

/// Fixes each column's type once and coerces every cell to it.
pub fn build_table(raw: &RawTable, options: &IngestOptions) -> Result<Outcome<Table>> {
    if options.strict_declarations {
        if let Some(column) = options
            .declared
            .keys()
            .find(|column| !raw.headers.contains(column))
        {
            return Err(IngestError::DeclaredColumnMissing {
                column: column.clone(),
            });
        }
    }

    let mut columns = Vec::with_capacity(raw.headers.len());
    let mut warnings = Vec::new();
    for (idx, name) in raw.headers.iter().enumerate() {
        let cells = raw.column(idx);
        let declared = options.declared.get(name).copied();
        let ty = declared.unwrap_or_else(|| infer_column_type(&cells, options.numeric_threshold));
        debug!(column = %name, ty = %ty, declared = declared.is_some(), "column type fixed");
        let (column, column_warnings) = coerce_column(name, &cells, ty).into_parts();
        for warning in &column_warnings {
            warn!(column = %name, "{warning}");
        }
        warnings.extend(column_warnings);
        columns.push(column);
    }

    let table = Table::from_columns(columns)?;
    info!(
        rows = table.height(),
        columns = table.width(),
        warnings = warnings.len(),
        "dataset loaded"
    );
    Ok(Outcome::with_warnings(table, warnings))
}

//! CSV export.
//!
//! Headers are written verbatim and cells by [`Value::label`], so numbers use
//! the shortest text that parses back to the same `f64`, datetimes use the
//! loader's ISO form and nulls are empty. Reading a written file with the
//! same declared column types reproduces the table.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;
use tvp_model::{Matrix, Table, Value};

use crate::error::{ReportError, Result};

/// Writes `table` as CSV with a header row.
pub fn write_table_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(table.column_names())?;
    for row in table.rows()? {
        out.write_record(row.iter().map(Value::label))?;
    }
    out.flush()?;
    Ok(())
}

/// Writes a matrix as CSV: the index name and column labels as header, then
/// one line per row label.
pub fn write_matrix_csv<W: Write>(matrix: &Matrix, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    let header = std::iter::once(matrix.index_name.clone())
        .chain(matrix.column_labels.iter().map(Value::label));
    out.write_record(header)?;
    for (label, cells) in matrix.row_labels.iter().zip(&matrix.cells) {
        let line = std::iter::once(label.label()).chain(cells.iter().map(Value::label));
        out.write_record(line)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_table_csv_file(table: &Table, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| ReportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_table_csv(table, file)?;
    info!(path = %path.display(), rows = table.height(), "wrote CSV");
    Ok(())
}

pub fn write_matrix_csv_file(matrix: &Matrix, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| ReportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_matrix_csv(matrix, file)?;
    info!(path = %path.display(), rows = matrix.row_labels.len(), "wrote CSV");
    Ok(())
}

/// CSV text of `table`.
pub fn table_csv_string(table: &Table) -> Result<String> {
    let mut buffer = Vec::new();
    write_table_csv(table, &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| ReportError::Io(std::io::Error::other(err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvp_model::{ColumnData, ColumnType};

    #[test]
    fn nulls_are_empty_and_commas_quoted() {
        let table = Table::from_columns(vec![
            ColumnData::new(
                "Location",
                ColumnType::Text,
                vec!["Pune, MH".into(), Value::Null],
            ),
            ColumnData::new("count", ColumnType::Number, vec![3.0.into(), 0.25.into()]),
        ])
        .unwrap();
        let text = table_csv_string(&table).unwrap();
        insta::assert_snapshot!(text.trim_end(), @r#"
        Location,count
        "Pune, MH",3
        ,0.25
        "#);
    }

    #[test]
    fn matrix_header_uses_index_name() {
        let mut matrix = Matrix::filled(
            "Weather",
            "Time_Block",
            "count",
            vec!["Fog".into(), "Rain".into()],
            vec!["Night".into(), "Morning".into()],
            &Value::Number(0.0),
        );
        matrix.set(1, 0, Value::Number(4.0));
        let mut buffer = Vec::new();
        write_matrix_csv(&matrix, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        insta::assert_snapshot!(text.trim_end(), @r"
        Weather,Night,Morning
        Fog,0,0
        Rain,4,0
        ");
    }
}

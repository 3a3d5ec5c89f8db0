//! Export then reload with the same declared types.

use chrono::NaiveDate;
use proptest::prelude::*;
use tempfile::TempDir;
use tvp_ingest::{IngestOptions, read_csv_reader, read_csv_table};
use tvp_model::{ColumnData, ColumnType, Table, Value};
use tvp_report::{table_csv_string, write_table_csv_file};

fn declared(table: &Table) -> IngestOptions {
    table
        .schema()
        .fields()
        .iter()
        .fold(IngestOptions::default().verbatim(), |options, field| {
            options.declare(field.name.clone(), field.ty)
        })
}

fn reload(table: &Table) -> Table {
    let text = table_csv_string(table).unwrap();
    let outcome = read_csv_reader(text.as_bytes(), &declared(table)).unwrap();
    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    outcome.value
}

#[test]
fn test_mixed_types_reload_exactly() {
    let stamp = NaiveDate::from_ymd_opt(2023, 7, 14)
        .unwrap()
        .and_hms_opt(18, 5, 0)
        .unwrap();
    let table = Table::from_columns(vec![
        ColumnData::new(
            "Registration_State",
            ColumnType::Text,
            vec!["Tamil Nadu".into(), "Goa, North".into(), Value::Null],
        ),
        ColumnData::new(
            "Fine_Amount",
            ColumnType::Number,
            vec![(0.1 + 0.2).into(), (-1250.5).into(), 1e-7.into()],
        ),
        ColumnData::new(
            "Issue_Date",
            ColumnType::DateTime,
            vec![stamp.into(), Value::Null, stamp.date().and_hms_opt(0, 0, 0).unwrap().into()],
        ),
        ColumnData::new(
            "Helmet_Worn",
            ColumnType::Boolean,
            vec![true.into(), false.into(), Value::Null],
        ),
    ])
    .unwrap();

    let reloaded = reload(&table);
    assert_eq!(reloaded.schema(), table.schema());
    assert_eq!(reloaded.rows().unwrap(), table.rows().unwrap());
}

#[test]
fn test_text_and_headers_reload_as_written() {
    let table = Table::from_columns(vec![
        ColumnData::new(
            "Vehicle  Model",
            ColumnType::Text,
            vec!["\"Quoted\"".into(), "12\" rim".into(), " padded ".into()],
        ),
        ColumnData::new(" Fine ", ColumnType::Number, vec![1.0.into(), Value::Null, 3.0.into()]),
    ])
    .unwrap();

    let reloaded = reload(&table);
    assert_eq!(reloaded.column_names(), vec!["Vehicle  Model", " Fine "]);
    assert_eq!(
        reloaded.values("Vehicle  Model").unwrap(),
        table.values("Vehicle  Model").unwrap()
    );
    assert_eq!(reloaded.rows().unwrap(), table.rows().unwrap());
}

#[test]
fn test_file_export() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("monthly.csv");
    let table = Table::from_columns(vec![
        ColumnData::new("Month", ColumnType::Text, vec!["Jan".into(), "Feb".into()]),
        ColumnData::new("count", ColumnType::Number, vec![41.0.into(), 0.0.into()]),
    ])
    .unwrap();
    write_table_csv_file(&table, &path).unwrap();

    let loaded = read_csv_table(&path, &declared(&table)).unwrap().value;
    assert_eq!(loaded.column_names(), vec!["Month".to_string(), "count".to_string()]);
    assert_eq!(loaded.numbers("count").unwrap(), vec![Some(41.0), Some(0.0)]);
}

proptest! {
    #[test]
    fn test_finite_numbers_survive_export(values in prop::collection::vec(-1e12f64..1e12, 1..20)) {
        let table = Table::from_columns(vec![ColumnData::new(
            "value",
            ColumnType::Number,
            values.iter().copied().map(Value::from).collect(),
        )])
        .unwrap();
        let reloaded = reload(&table);
        let expected: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
        prop_assert_eq!(reloaded.numbers("value").unwrap(), expected);
    }
}

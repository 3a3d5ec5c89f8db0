//! End-to-end requests through the JSON-configurable boundary.

use chrono::NaiveDate;
use tvp_engine::{AnalysisRequest, Output, execute, execute_batch};
use tvp_model::{AnalysisError, ColumnData, ColumnType, Table, Value, Warning};

fn violations() -> Table {
    let on = |month: u32, day: u32, hour: u32| {
        Value::DateTime(
            NaiveDate::from_ymd_opt(2023, month, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        )
    };
    Table::from_columns(vec![
        ColumnData::new(
            "Date",
            ColumnType::DateTime,
            vec![on(1, 5, 8), on(1, 20, 13), on(3, 2, 22), on(7, 14, 3), on(7, 30, 9)],
        ),
        ColumnData::new(
            "Violation_Type",
            ColumnType::Text,
            vec![
                "Speeding".into(),
                "Parking".into(),
                "Speeding".into(),
                "Drunk Driving".into(),
                "Speeding".into(),
            ],
        ),
        ColumnData::new(
            "Fine_Amount",
            ColumnType::Number,
            vec![500.0.into(), 200.0.into(), 700.0.into(), 5000.0.into(), Value::Null],
        ),
    ])
    .unwrap()
}

fn request(json: &str) -> AnalysisRequest {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_monthly_counts_in_calendar_order() {
    let req = request(
        r#"{
            "prepare": {"buckets": [{"source": "Date", "bucket": "month"}]},
            "analysis": {"kind": "group", "group_by": ["Month"]},
            "order": {"categories": "months"}
        }"#,
    );
    let response = execute(&violations(), &req).unwrap();
    assert!(response.warnings.is_empty());
    let Output::Table(table) = response.output else {
        panic!("expected a table");
    };
    assert_eq!(table.height(), 12);
    let counts = table.numbers("count").unwrap();
    assert_eq!(counts[0], Some(2.0));
    assert_eq!(counts[1], Some(0.0));
    assert_eq!(counts[2], Some(1.0));
    assert_eq!(counts[6], Some(2.0));
}

#[test]
fn test_pivot_table_of_fines_by_time_block() {
    let req = request(
        r#"{
            "prepare": {"buckets": [{"source": "Date", "bucket": "time_block"}]},
            "analysis": {
                "kind": "pivot_table",
                "index": "Violation_Type",
                "columns": "Time_Block",
                "values": "Fine_Amount",
                "function": "sum"
            },
            "order": {"axis": "columns", "categories": "time_blocks"}
        }"#,
    );
    let response = execute(&violations(), &req).unwrap();
    let Output::Matrix(matrix) = response.output else {
        panic!("expected a matrix");
    };
    assert_eq!(
        matrix.column_labels,
        vec![
            Value::from("Morning"),
            Value::from("Afternoon"),
            Value::from("Evening"),
            Value::from("Night")
        ]
    );
    assert_eq!(
        matrix.get(&"Speeding".into(), &"Evening".into()),
        Some(&Value::Number(700.0))
    );
    assert_eq!(
        matrix.get(&"Drunk Driving".into(), &"Night".into()),
        Some(&Value::Number(5000.0))
    );
    // Speeding in the morning has one fine and one missing fine.
    assert_eq!(
        matrix.get(&"Speeding".into(), &"Morning".into()),
        Some(&Value::Number(500.0))
    );
}

#[test]
fn test_filter_with_no_rows_is_empty_result() {
    let req = request(
        r#"{
            "prepare": {
                "date_range": {"column": "Date", "start": "2024-01-01", "end": "2024-12-31"}
            },
            "analysis": {"kind": "value_counts", "column": "Violation_Type"}
        }"#,
    );
    let response = execute(&violations(), &req).unwrap();
    assert!(matches!(response.output, Output::Empty));
    assert!(matches!(
        &response.warnings[..],
        [Warning::EmptyResult { stage }] if stage == "filtering"
    ));
}

#[test]
fn test_unknown_column_reported_even_when_filter_empties_table() {
    let req = request(
        r#"{
            "prepare": {
                "date_range": {"column": "Date", "start": "2024-01-01", "end": "2024-12-31"}
            },
            "analysis": {"kind": "value_counts", "column": "Violation_Typo"}
        }"#,
    );
    let err = execute(&violations(), &req).unwrap_err();
    assert!(matches!(err, AnalysisError::Schema { column, .. } if column == "Violation_Typo"));
}

#[test]
fn test_correlation_over_numeric_columns() {
    let req = request(r#"{"analysis": {"kind": "correlation"}}"#);
    let response = execute(&violations(), &req).unwrap();
    let Output::Matrix(matrix) = &response.output else {
        panic!("expected a matrix");
    };
    assert_eq!(matrix.row_labels, vec![Value::from("Fine_Amount")]);
    assert_eq!(matrix.cells, vec![vec![Value::Number(1.0)]]);

    let req = request(r#"{"analysis": {"kind": "correlation", "columns": ["Violation_Type"]}}"#);
    let err = execute(&violations(), &req).unwrap_err();
    assert!(matches!(err, AnalysisError::TypeMismatch { .. }));
}

#[test]
fn test_batch_isolates_failures() {
    let requests = vec![
        request(r#"{"analysis": {"kind": "group", "group_by": ["Weather"]}}"#),
        request(
            r#"{
                "analysis": {"kind": "group", "group_by": ["Violation_Type"],
                             "measures": ["Fine_Amount"], "functions": ["mean", "count"]},
                "present": {"sort_by": "Fine_Amount_mean", "descending": true, "limit": 1}
            }"#,
        ),
    ];
    let results = execute_batch(&violations(), &requests);
    assert_eq!(results.len(), 2);
    assert!(matches!(results[0], Err(AnalysisError::Schema { .. })));
    let Ok(response) = &results[1] else {
        panic!("second request should succeed");
    };
    let Output::Table(table) = &response.output else {
        panic!("expected a table");
    };
    assert_eq!(table.height(), 1);
    assert_eq!(table.values("Violation_Type").unwrap(), vec![Value::from("Drunk Driving")]);
}

#[test]
fn test_reversed_date_range_fails_request() {
    let req = request(
        r#"{
            "prepare": {
                "date_range": {"column": "Date", "start": "2023-12-31", "end": "2023-01-01"}
            },
            "analysis": {"kind": "describe"}
        }"#,
    );
    let err = execute(&violations(), &req).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidDateRange { .. }));
}

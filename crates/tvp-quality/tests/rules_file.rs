//! Quality rules loaded from disk and applied to a table.

use std::io::Write;

use tempfile::NamedTempFile;
use tvp_model::{ColumnData, ColumnType, Table, Value};
use tvp_quality::{QualityError, QualityRules, outlier_count, summarize};

fn write_rules(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn speeds() -> Table {
    Table::from_columns(vec![
        ColumnData::new(
            "Recorded_Speed",
            ColumnType::Number,
            vec![10.0.into(), 12.0.into(), 11.0.into(), 13.0.into(), 1000.0.into()],
        ),
        ColumnData::new(
            "Gender",
            ColumnType::Text,
            vec!["Male".into(), "Female".into(), "X".into(), Value::Null, "female".into()],
        ),
    ])
    .unwrap()
}

#[test]
fn test_iqr_outlier_scenario() {
    assert_eq!(outlier_count(&speeds(), "Recorded_Speed"), 1);
}

#[test]
fn test_rules_from_file() {
    let file = write_rules(
        r#"
outlier_columns = ["Recorded_Speed"]

[[domain]]
column = "Gender"
rule = "one_of"
values = ["Male", "Female"]

[[domain]]
column = "Recorded_Speed"
rule = "at_most"
max = 200
"#,
    );
    let rules = QualityRules::load(file.path()).unwrap();
    let report = summarize(&speeds(), &rules).unwrap();

    assert_eq!(report.outliers.len(), 1);
    assert_eq!(report.outliers[0].count, 1);
    assert_eq!(report.violations[0].count, 1);
    assert_eq!(report.violations[1].count, 1);
    assert_eq!(report.violations[1].rule, "<= 200");
}

#[test]
fn test_missing_rules_file() {
    let err = QualityRules::load(std::path::Path::new("/nonexistent/rules.toml")).unwrap_err();
    assert!(matches!(err, QualityError::Io { .. }));
}

#[test]
fn test_malformed_rules_file() {
    let file = write_rules("outlier_columns = 3\n");
    let err = QualityRules::load(file.path()).unwrap_err();
    assert!(matches!(err, QualityError::Toml { .. }));
}

#[test]
fn test_report_serializes_for_renderers() {
    let report = summarize(&speeds(), &QualityRules::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["rows"], 5);
    assert_eq!(json["outliers"][0]["column"], "Recorded_Speed");
}

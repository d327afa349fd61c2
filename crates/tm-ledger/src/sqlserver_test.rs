use super::*;
use crate::test_support::sqlserver_platform;
use std::borrow::Cow;
use tm_platform::Platform;

fn text(value: &str) -> ColumnData<'static> {
    ColumnData::String(Some(Cow::Owned(value.to_string())))
}

fn record_cells() -> Vec<ColumnData<'static>> {
    vec![
        ColumnData::I64(Some(7)),
        text("1.02"),
        ColumnData::I64(Some(1_700_000_000_000)),
        text("deploy"),
        text("tidemark"),
        text("0.1.0"),
        text("Failed"),
        ColumnData::I64(Some(15)),
        text("v1.02/01_tickets.sql"),
        text("Invalid object name 'tickets'."),
        ColumnData::String(None),
    ]
}

#[test]
fn test_integer_value_widens() {
    assert_eq!(integer_value(ColumnData::I32(Some(1))).unwrap(), Some(1));
    assert_eq!(integer_value(ColumnData::U8(Some(3))).unwrap(), Some(3));
    assert_eq!(integer_value(ColumnData::I64(Some(-2))).unwrap(), Some(-2));
    assert_eq!(integer_value(ColumnData::I32(None)).unwrap(), None);
}

#[test]
fn test_integer_value_rejects_text() {
    let err = integer_value(text("1")).unwrap_err();
    assert!(matches!(err, SqlServerError::Client(_)));
}

#[test]
fn test_text_value() {
    assert_eq!(text_value(text("2.01")).unwrap().as_deref(), Some("2.01"));
    assert_eq!(text_value(ColumnData::String(None)).unwrap(), None);
    assert!(text_value(ColumnData::I32(Some(1))).is_err());
}

#[test]
fn test_ledger_row_decodes_records_query_columns() {
    let row = ledger_row(record_cells()).unwrap();
    assert_eq!(row.sequence_id, 7);
    assert_eq!(row.version, "1.02");
    assert_eq!(row.applied_on_epoch_ms, 1_700_000_000_000);
    assert_eq!(row.status, "Failed");
    assert_eq!(row.duration_ms, 15);
    assert_eq!(row.failed_script_path.as_deref(), Some("v1.02/01_tickets.sql"));
    assert_eq!(row.additional_artifacts, None);
}

#[test]
fn test_ledger_row_rejects_null_required_column() {
    let mut cells = record_cells();
    cells[1] = ColumnData::String(None);
    let err = ledger_row(cells).unwrap_err();
    assert!(err.to_string().contains("Version is NULL"), "{err}");
}

#[test]
fn test_ledger_row_rejects_short_row() {
    let mut cells = record_cells();
    cells.truncate(8);
    let err = ledger_row(cells).unwrap_err();
    assert!(err.to_string().contains("no FailedScriptPath column"), "{err}");
}

#[test]
fn test_decode_errors_are_classified_as_client_errors() {
    let err = ledger_row(Vec::new()).unwrap_err();
    let classification = sqlserver_platform().classify_error(&err);
    assert!(classification.recognized);
    assert!(classification
        .message
        .unwrap()
        .starts_with("SQL Server client error:"));
    assert!(!sqlserver_platform().is_unique_violation(&err));
}

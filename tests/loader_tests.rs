use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use monthly_oc_diff::config::DataConfig;
use monthly_oc_diff::error::LoadError;
use monthly_oc_diff::loader::{load_price_records, read_price_records};

fn temp_csv(name: &str, body: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mocd-loader-{}-{}", name, uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("prices.csv");
    fs::write(&path, body).expect("write csv");
    path
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
/// Nasdaq-style export: `Close/Last` header, `$` prefixes, US dates, newest first.
fn loads_dollar_prefixed_export_in_source_order() {
    let path = temp_csv(
        "nasdaq",
        "Date,Close/Last,Volume,Open,High,Low\n\
         02/02/2024,$187.68,102518000,$188.42,$189.88,$185.25\n\
         01/31/2024,$184.40,55467800,$187.04,$187.10,$184.35\n",
    );

    let records = load_price_records(&path, &DataConfig::default()).expect("load");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
    assert_eq!(records[0].open, dec("188.42"));
    assert_eq!(records[0].close, dec("187.68"));
    assert_eq!(records[0].line, 2);
    assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    assert_eq!(records[1].line, 3);
}

#[test]
fn loads_iso_dates_and_plain_numbers() {
    let body = "Date,Open,Close\n2024-01-05,100,105\n2024-01-20,102,99\n";
    let records = read_price_records(body.as_bytes(), &DataConfig::default()).expect("load");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].open, dec("102"));
    assert_eq!(records[1].close, dec("99"));
}

#[test]
fn missing_file_is_open_error() {
    let path = std::env::temp_dir().join(format!("mocd-missing-{}.csv", uuid::Uuid::new_v4()));
    let err = load_price_records(&path, &DataConfig::default()).unwrap_err();
    assert!(matches!(err, LoadError::Open { .. }), "got {err:?}");
}

#[test]
fn missing_close_column_is_reported_by_name() {
    let path = temp_csv("no-close", "Date,Open,High\n2024-01-05,100,110\n");
    let err = load_price_records(&path, &DataConfig::default()).unwrap_err();
    match err {
        LoadError::MissingColumn(name) => assert_eq!(name, "Close"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn blank_price_fails_whole_load() {
    let body = "Date,Open,Close\n2024-01-05,100,105\n2024-01-06,,101\n";
    let err = read_price_records(body.as_bytes(), &DataConfig::default()).unwrap_err();
    match err {
        LoadError::MissingValue { line, column } => {
            assert_eq!(line, 3);
            assert_eq!(column, "Open");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn short_row_is_missing_value() {
    let body = "Date,Open,Close\n2024-01-05,100\n";
    let err = read_price_records(body.as_bytes(), &DataConfig::default()).unwrap_err();
    assert!(matches!(err, LoadError::MissingValue { line: 2, .. }), "got {err:?}");
}

#[test]
fn unparseable_date_and_price_are_rejected() {
    let bad_date = "Date,Open,Close\nyesterday,100,105\n";
    let err = read_price_records(bad_date.as_bytes(), &DataConfig::default()).unwrap_err();
    assert!(matches!(err, LoadError::InvalidDate { line: 2, .. }), "got {err:?}");

    let bad_price = "Date,Open,Close\n2024-01-05,100,USD105\n";
    let err = read_price_records(bad_price.as_bytes(), &DataConfig::default()).unwrap_err();
    match err {
        LoadError::InvalidPrice { column, value, .. } => {
            assert_eq!(column, "Close");
            assert_eq!(value, "USD105");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn header_only_file_is_empty_error() {
    let path = temp_csv("empty", "Date,Open,Close\n");
    let err = load_price_records(&path, &DataConfig::default()).unwrap_err();
    assert!(matches!(err, LoadError::Empty(_)), "got {err:?}");
}

#[test]
fn custom_column_names_from_config() {
    let cfg = DataConfig {
        date_column: "day".to_string(),
        open_column: "o".to_string(),
        close_columns: vec!["c".to_string()],
        ..DataConfig::default()
    };
    let body = "day,o,c\n2024-03-01,10.5,11\n";
    let records = read_price_records(body.as_bytes(), &cfg).expect("load");
    assert_eq!(records[0].close - records[0].open, dec("0.5"));
}

#[test]
/// Prices at the edge of `Decimal` range are rejected up front, so the
/// difference and monthly sums downstream cannot overflow.
fn oversized_prices_are_invalid_not_fatal() {
    let body = "Date,Open,Close\n2024-01-05,-79228162514264337593543950335,79228162514264337593543950335\n";
    let err = read_price_records(body.as_bytes(), &DataConfig::default()).unwrap_err();
    match err {
        LoadError::InvalidPrice { line, column, .. } => {
            assert_eq!(line, 2);
            assert_eq!(column, "Open");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn exponent_and_underscore_prices_are_invalid() {
    let body = "Date,Open,Close\n2024-01-05,1_0,1e2\n";
    let err = read_price_records(body.as_bytes(), &DataConfig::default()).unwrap_err();
    assert!(
        matches!(err, LoadError::InvalidPrice { ref value, .. } if value == "1_0"),
        "got {err:?}"
    );

    let body = "Date,Open,Close\n2024-01-05,10,1e2\n";
    let err = read_price_records(body.as_bytes(), &DataConfig::default()).unwrap_err();
    assert!(
        matches!(err, LoadError::InvalidPrice { ref value, .. } if value == "1e2"),
        "got {err:?}"
    );
}

#[test]
fn misgrouped_thousands_are_invalid() {
    let body = "Date,Open,Close\n2024-01-05,\"1,2,3\",100\n";
    let err = read_price_records(body.as_bytes(), &DataConfig::default()).unwrap_err();
    assert!(matches!(err, LoadError::InvalidPrice { .. }), "got {err:?}");

    let body = "Date,Open,Close\n2024-01-05,\"$1,234.50\",\"$1,235.00\"\n";
    let records = read_price_records(body.as_bytes(), &DataConfig::default()).expect("load");
    assert_eq!(records[0].close - records[0].open, dec("0.50"));
}

//! Tests for heterogeneous date parsing.

use chrono::NaiveDate;
use polars::prelude::{AnyValue, Column, DataFrame, DataType, IntoColumn, NamedFrom, Series};

use raccoon_transform::{any_to_date, normalize_demographics, parse_date};

fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn date_inputs() -> Vec<Option<&'static str>> {
    vec![
        Some("2022-01-03"),
        Some("01-02-2020"),
        Some("44115"),
        None,
        Some("2022-12-27 08:26:49"),
        Some("01/02/1995"),
        Some("2/3/2022"),
        Some("2/16/2022"),
    ]
}

fn expected_dates() -> Vec<Option<NaiveDate>> {
    vec![
        ymd(2022, 1, 3),
        ymd(2020, 1, 2),
        None,
        None,
        ymd(2022, 12, 27),
        ymd(1995, 1, 2),
        ymd(2022, 2, 3),
        ymd(2022, 2, 16),
    ]
}

#[test]
fn parses_mixed_source_formats() {
    let parsed: Vec<Option<NaiveDate>> = date_inputs()
        .into_iter()
        .map(|value| value.and_then(parse_date))
        .collect();
    assert_eq!(parsed, expected_dates());
}

#[test]
fn spreadsheet_serial_dates_are_rejected() {
    assert_eq!(parse_date("44115"), None);
    assert_eq!(parse_date("45496"), None);
    assert_eq!(any_to_date(AnyValue::Int32(45496)), None);
}

#[test]
fn normalizes_string_date_column() {
    let height = date_inputs().len();
    let df = DataFrame::new(vec![
        Column::new("first".into(), vec![Some("Alice"); height]),
        Column::new("last".into(), vec![Some("Smith"); height]),
        Column::new("dob".into(), date_inputs()),
        Column::new("collected".into(), date_inputs()),
    ])
    .unwrap();

    let normalized = normalize_demographics(&df, ["first", "last", "dob", "collected"]).unwrap();
    let dob = normalized.column("dob_clean").unwrap();
    assert_eq!(dob.dtype(), &DataType::Date);

    let parsed: Vec<Option<NaiveDate>> = (0..height)
        .map(|idx| any_to_date(dob.get(idx).unwrap()))
        .collect();
    assert_eq!(parsed, expected_dates());
}

#[test]
fn native_datetime_column_is_truncated() {
    // 2022-12-27 08:26:49 UTC in milliseconds
    let millis = Series::new("collected".into(), vec![Some(1_672_129_609_000_i64), None])
        .cast(&DataType::Datetime(
            polars::prelude::TimeUnit::Milliseconds,
            None,
        ))
        .unwrap()
        .into_column();
    let df = DataFrame::new(vec![
        Column::new("first".into(), vec!["Ann", "Bob"]),
        Column::new("last".into(), vec!["Lee", "Ray"]),
        Column::new("dob".into(), vec!["1990-06-21", "1990-06-21"]),
        millis,
    ])
    .unwrap();

    let normalized = normalize_demographics(&df, ["first", "last", "dob", "collected"]).unwrap();
    let collected = normalized.column("collection_date_clean").unwrap();
    assert_eq!(any_to_date(collected.get(0).unwrap()), ymd(2022, 12, 27));
    assert_eq!(any_to_date(collected.get(1).unwrap()), None);
}

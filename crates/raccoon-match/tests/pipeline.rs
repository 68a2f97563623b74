//! End-to-end match runs over small submission and reference tables.

use polars::prelude::{AnyValue, Column, DataFrame, IntoLazy, NamedFrom};
use raccoon_match::{DataFrameMatcher, MatchResult};
use raccoon_model::columns::{EXACT_MATCH_BASIS, SYNTHETIC_KEY};
use raccoon_model::{Bucket, ColumnBinding, DemographicField, MatchConfig, MatchError};

type Row<'a> = (&'a str, Option<&'a str>, Option<&'a str>, Option<&'a str>, Option<&'a str>);

fn submissions(rows: &[Row<'_>]) -> DataFrame {
    DataFrame::new(vec![
        Column::new("ID".into(), rows.iter().map(|r| r.0).collect::<Vec<_>>()),
        Column::new("FIRST_NAME".into(), rows.iter().map(|r| r.1).collect::<Vec<_>>()),
        Column::new("LAST_NAME".into(), rows.iter().map(|r| r.2).collect::<Vec<_>>()),
        Column::new("DOB".into(), rows.iter().map(|r| r.3).collect::<Vec<_>>()),
        Column::new("COLLECTED".into(), rows.iter().map(|r| r.4).collect::<Vec<_>>()),
    ])
    .unwrap()
}

fn reference(rows: &[Row<'_>]) -> DataFrame {
    DataFrame::new(vec![
        Column::new("CASE_ID".into(), rows.iter().map(|r| r.0).collect::<Vec<_>>()),
        Column::new("FIRST_NAME".into(), rows.iter().map(|r| r.1).collect::<Vec<_>>()),
        Column::new("LAST_NAME".into(), rows.iter().map(|r| r.2).collect::<Vec<_>>()),
        Column::new("PATIENT_DOB".into(), rows.iter().map(|r| r.3).collect::<Vec<_>>()),
        Column::new(
            "SPECIMEN_COLLECTED".into(),
            rows.iter().map(|r| r.4).collect::<Vec<_>>(),
        ),
    ])
    .unwrap()
}

fn config() -> MatchConfig {
    MatchConfig::new(
        "FIRST_NAME",
        "LAST_NAME",
        ("DOB", "PATIENT_DOB"),
        ("COLLECTED", "SPECIMEN_COLLECTED"),
    )
    .with_key("ID")
}

fn run(subs: DataFrame, refs: DataFrame, config: MatchConfig) -> MatchResult {
    DataFrameMatcher::new(subs, refs, config)
        .unwrap()
        .match_records()
        .unwrap()
}

fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect()
}

fn some(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|value| Some((*value).to_string())).collect()
}

fn mixed_run() -> MatchResult {
    let subs = submissions(&[
        ("S1", Some("Ann"), Some("Lee"), Some("1985-03-14"), Some("2024-05-10")),
        ("S2", Some("Grant"), Some("Mitchell"), Some("1990-06-21"), Some("2024-12-02")),
        ("S3", Some("GRANT"), Some("MITHCELL"), Some("1990-06-22"), Some("2024-12-02")),
        ("S4", None, Some("Lee"), Some("1985-03-14"), Some("2024-05-10")),
        ("S5", Some("Smith"), Some("Davis"), Some("1970-01-01"), Some("2024-01-15")),
    ]);
    let refs = reference(&[
        ("C1", Some("ANN"), Some("LEE"), Some("03/14/1985"), Some("05/09/2024")),
        ("C2", Some("GRANT"), Some("MITHCELL"), Some("06/21/1990"), Some("11/29/2024")),
        ("C3", Some("DAVIS"), Some("SMITH"), Some("01/01/1970"), Some("01/10/2024")),
    ]);
    run(subs, refs, config())
}

#[test]
fn every_submission_lands_in_one_bucket() {
    let result = mixed_run();
    insta::assert_json_snapshot!(result.counts(), @r#"
    {
      "exact_matched": 1,
      "fuzzy_matched": 2,
      "fuzzy_unmatched": 1,
      "no_demo": 1
    }
    "#);

    let mut keys: Vec<Option<String>> = result
        .iter()
        .flat_map(|(_, table)| strings(table, "ID"))
        .collect();
    keys.sort();
    assert_eq!(keys, some(&["S1", "S2", "S3", "S4", "S5"]));
}

#[test]
fn exact_match_joins_reference_columns() {
    let result = mixed_run();
    let exact = &result.exact_matched;
    assert_eq!(strings(exact, "ID"), some(&["S1"]));
    assert_eq!(strings(exact, "CASE_ID"), some(&["C1"]));
    assert_eq!(strings(exact, "FIRST_NAME_ref"), some(&["ANN"]));
    assert_eq!(strings(exact, "first_name_clean"), some(&["ANN"]));
    assert_eq!(strings(exact, EXACT_MATCH_BASIS), some(&["demographics"]));
}

#[test]
fn fuzzy_matches_carry_scores() {
    let result = mixed_run();
    let fuzzy = &result.fuzzy_matched;
    assert_eq!(strings(fuzzy, "ID"), some(&["S2", "S5"]));
    assert_eq!(strings(fuzzy, "CASE_ID"), some(&["C2", "C3"]));

    let ratio = fuzzy.column("match_ratio").unwrap();
    assert_eq!(ratio.get(0).unwrap(), AnyValue::Float64(94.0));
    let reverse = fuzzy.column("reverse_match_ratio").unwrap();
    assert_eq!(reverse.get(1).unwrap(), AnyValue::Float64(100.0));

    let days = fuzzy.column("day_diff").unwrap();
    assert_eq!(days.get(0).unwrap(), AnyValue::Int64(3));
    assert_eq!(days.get(1).unwrap(), AnyValue::Int64(5));
    let business = fuzzy.column("business_day_diff").unwrap();
    assert_eq!(business.get(0).unwrap(), AnyValue::Int64(1));
    assert_eq!(business.get(1).unwrap(), AnyValue::Int64(3));
}

#[test]
fn no_dob_match_lands_in_fuzzy_unmatched() {
    let result = mixed_run();
    let unmatched = &result.fuzzy_unmatched;
    assert_eq!(strings(unmatched, "ID"), some(&["S3"]));
    assert_eq!(strings(unmatched, "CASE_ID"), vec![None]);
    assert_eq!(unmatched.column("max_ratio").unwrap().null_count(), 1);
}

#[test]
fn no_demo_keeps_original_columns_only() {
    let result = mixed_run();
    assert_eq!(strings(&result.no_demo, "ID"), some(&["S4"]));
    assert_eq!(
        result.no_demo.get_column_names_str(),
        ["ID", "FIRST_NAME", "LAST_NAME", "DOB", "COLLECTED"]
    );
}

#[test]
fn all_matched_stacks_exact_and_fuzzy() {
    let result = mixed_run();
    let matched = result.all_matched().unwrap();
    assert_eq!(matched.height(), 3);
    assert_eq!(strings(&matched, "ID"), some(&["S1", "S2", "S5"]));
    assert_eq!(matched.column(EXACT_MATCH_BASIS).unwrap().null_count(), 2);
    assert_eq!(matched.column("max_ratio").unwrap().null_count(), 1);
    assert_eq!(result.bucket(Bucket::FuzzyMatched).height(), 2);
}

#[test]
fn day_max_picks_the_close_candidate() {
    let subs = submissions(&[(
        "S1",
        Some("GRANT"),
        Some("MITCHELL"),
        Some("1990-06-21"),
        Some("2024-12-02"),
    )]);
    let refs = reference(&[
        ("FAR", Some("GRANT"), Some("MITHCELL"), Some("1990-06-21"), Some("2025-03-02")),
        ("NEAR", Some("GRANT"), Some("MITHCELL"), Some("1990-06-21"), Some("2024-11-29")),
    ]);
    let result = run(subs, refs, config().with_day_max(Some(10)));
    assert_eq!(strings(&result.fuzzy_matched, "CASE_ID"), some(&["NEAR"]));
    let days = result.fuzzy_matched.column("day_diff").unwrap();
    assert_eq!(days.get(0).unwrap(), AnyValue::Int64(3));
}

#[test]
fn every_candidate_beyond_day_max_is_unmatched() {
    let subs = submissions(&[(
        "S1",
        Some("GRANT"),
        Some("MITCHELL"),
        Some("1990-06-21"),
        Some("2024-12-02"),
    )]);
    let refs = reference(&[
        ("FAR", Some("GRANT"), Some("MITHCELL"), Some("1990-06-21"), Some("2025-03-02")),
        ("LESS_FAR", Some("GRANT"), Some("MITHCELL"), Some("1990-06-21"), Some("2024-10-23")),
    ]);
    let result = run(subs, refs, config().with_day_max(Some(10)));
    assert_eq!(result.fuzzy_matched.height(), 0);
    assert_eq!(strings(&result.fuzzy_unmatched, "ID"), some(&["S1"]));
    // kept for review, not accepted
    assert_eq!(strings(&result.fuzzy_unmatched, "CASE_ID"), some(&["FAR"]));
}

#[test]
fn business_day_max_bounds_fuzzy_matches() {
    let subs = submissions(&[(
        "S1",
        Some("GRANT"),
        Some("MITCHELL"),
        Some("1990-06-21"),
        Some("2024-12-09"),
    )]);
    let refs = reference(&[(
        "C1",
        Some("GRANT"),
        Some("MITHCELL"),
        Some("1990-06-21"),
        Some("2024-12-02"),
    )]);
    let loose = run(subs.clone(), refs.clone(), config().with_business_day_max(Some(5)));
    assert_eq!(loose.counts().fuzzy_matched, 1);
    let strict = run(subs, refs, config().with_business_day_max(Some(4)));
    assert_eq!(strict.counts().fuzzy_unmatched, 1);
}

#[test]
fn business_day_max_passes_over_a_nearer_calendar_candidate() {
    // Thursday collection: the Monday before is 3 business days away, the Monday after 2
    let subs = submissions(&[(
        "S1",
        Some("GRANT"),
        Some("MITCHELL"),
        Some("1990-06-21"),
        Some("2024-12-05"),
    )]);
    let refs = reference(&[
        ("X", Some("GRAXX"), Some("MITCHELL"), Some("1990-06-21"), Some("2024-12-02")),
        ("Y", Some("GRANTT"), Some("MITCHELL"), Some("1990-06-21"), Some("2024-12-09")),
    ]);
    for threshold in [60.0, 85.0] {
        let config = config()
            .with_threshold(threshold)
            .with_business_day_max(Some(2));
        let result = run(subs.clone(), refs.clone(), config);
        assert_eq!(strings(&result.fuzzy_matched, "ID"), some(&["S1"]));
        assert_eq!(strings(&result.fuzzy_matched, "CASE_ID"), some(&["Y"]));
        let business = result.fuzzy_matched.column("business_day_diff").unwrap();
        assert_eq!(business.get(0).unwrap(), AnyValue::Int64(2));
    }
}

#[test]
fn exact_tie_prefers_earlier_reference_date() {
    let subs = submissions(&[("S1", Some("Ann"), Some("Lee"), Some("1985-03-14"), Some("2024-05-10"))]);
    let refs = reference(&[
        ("LATER", Some("Ann"), Some("Lee"), Some("1985-03-14"), Some("2024-05-13")),
        ("EARLIER", Some("Ann"), Some("Lee"), Some("1985-03-14"), Some("2024-05-07")),
        ("FAR", Some("Ann"), Some("Lee"), Some("1985-03-14"), Some("2023-05-07")),
    ]);
    let result = run(subs, refs, config());
    assert_eq!(strings(&result.exact_matched, "CASE_ID"), some(&["EARLIER"]));
}

#[test]
fn identifier_hit_bypasses_demographics() {
    let subs = submissions(&[
        ("WA001", None, None, None, None),
        ("WA404", None, None, None, None),
    ]);
    let mut refs = reference(&[("C1", Some("ANN"), Some("LEE"), Some("1985-03-14"), None)]);
    refs.with_column(Column::new("ACCESSION".into(), ["WA001"]))
        .unwrap();
    let result = run(subs, refs, config().with_identifier_columns(["ACCESSION"]));

    assert_eq!(strings(&result.exact_matched, "CASE_ID"), some(&["C1"]));
    assert_eq!(
        strings(&result.exact_matched, EXACT_MATCH_BASIS),
        some(&["identifier"])
    );
    assert_eq!(strings(&result.no_demo, "ID"), some(&["WA404"]));
}

#[test]
fn row_key_is_synthesized_without_a_key_column() {
    let subs = submissions(&[
        ("S1", None, None, None, None),
        ("S1", None, None, None, None),
    ]);
    let refs = reference(&[]);
    let matcher = DataFrameMatcher::new(subs, refs, MatchConfig { key: None, ..config() }).unwrap();
    assert_eq!(matcher.key(), SYNTHETIC_KEY);
    assert_eq!(matcher.submissions().get_column_names_str()[0], SYNTHETIC_KEY);

    let result = matcher.match_records().unwrap();
    let keys = result.no_demo.column(SYNTHETIC_KEY).unwrap();
    assert_eq!(keys.get(1).unwrap(), AnyValue::UInt64(1));
}

#[test]
fn reference_is_narrowed_to_requested_columns() {
    let refs = reference(&[("C1", Some("ANN"), Some("LEE"), None, None)]);
    let subs = submissions(&[]);
    let matcher = DataFrameMatcher::new(
        subs,
        refs,
        config().with_reference_columns(["CASE_ID", "FIRST_NAME"]),
    )
    .unwrap();
    assert_eq!(
        matcher.reference().get_column_names_str(),
        ["CASE_ID", "FIRST_NAME", "LAST_NAME", "PATIENT_DOB", "SPECIMEN_COLLECTED"]
    );
}

#[test]
fn lazy_inputs_match_like_eager_ones() {
    let subs = submissions(&[("S1", Some("Ann"), Some("Lee"), Some("1985-03-14"), Some("2024-05-10"))]);
    let refs = reference(&[("C1", Some("ANN"), Some("LEE"), Some("1985-03-14"), Some("2024-05-09"))]);
    let lazy = DataFrameMatcher::from_lazy(subs.clone().lazy(), refs.clone().lazy(), config())
        .unwrap()
        .match_records()
        .unwrap();
    let eager = run(subs, refs, config());
    assert!(lazy.exact_matched.equals_missing(&eager.exact_matched));
}

#[test]
fn empty_submissions_give_empty_tables() {
    let result = run(submissions(&[]), reference(&[]), config());
    assert_eq!(result.counts().total(), 0);
    assert!(result.fuzzy_unmatched.column("max_ratio").is_ok());
}

#[test]
fn unset_binding_is_a_configuration_error() {
    let config = MatchConfig::new("FIRST_NAME", "LAST_NAME", "DOB", ColumnBinding::default());
    let err = DataFrameMatcher::new(submissions(&[]), reference(&[]), config).unwrap_err();
    assert!(matches!(
        err,
        MatchError::MissingBinding {
            field: DemographicField::CollectionDate
        }
    ));
}

#[test]
fn missing_column_is_a_configuration_error() {
    let config = MatchConfig::new(
        "MIDDLE_NAME",
        "LAST_NAME",
        ("DOB", "PATIENT_DOB"),
        ("COLLECTED", "SPECIMEN_COLLECTED"),
    );
    let err = DataFrameMatcher::new(submissions(&[]), reference(&[]), config).unwrap_err();
    assert!(matches!(
        err,
        MatchError::MissingColumn { table: "submission", ref column } if column == "MIDDLE_NAME"
    ));
}

#[test]
fn duplicate_key_is_rejected() {
    let subs = submissions(&[("S1", None, None, None, None), ("S1", None, None, None, None)]);
    let err = DataFrameMatcher::new(subs, reference(&[]), config()).unwrap_err();
    assert!(matches!(err, MatchError::DuplicateKey { rows: 2, unique: 1, .. }));
}

#[test]
fn threshold_out_of_range_is_rejected() {
    let err = DataFrameMatcher::new(
        submissions(&[]),
        reference(&[]),
        config().with_threshold(120.0),
    )
    .unwrap_err();
    assert!(matches!(err, MatchError::InvalidThreshold(_)));
}

#[test]
fn derived_column_name_in_submissions_is_rejected() {
    let mut subs = submissions(&[("S1", Some("ANN"), Some("LEE"), None, None)]);
    subs.with_column(Column::new("match_ratio".into(), [1.0])).unwrap();
    let err = DataFrameMatcher::new(subs, reference(&[]), config()).unwrap_err();
    assert!(matches!(
        err,
        MatchError::ColumnCollision { table: "submission", ref column } if column == "match_ratio"
    ));
}

#[test]
fn existing_synthetic_key_column_is_rejected() {
    let mut subs = submissions(&[("S1", Some("ANN"), Some("LEE"), None, None)]);
    subs.rename("ID", SYNTHETIC_KEY.into()).unwrap();
    let mut config = config();
    config.key = None;
    let err = DataFrameMatcher::new(subs, reference(&[]), config).unwrap_err();
    assert!(matches!(
        err,
        MatchError::ColumnCollision { table: "submission", ref column } if column == SYNTHETIC_KEY
    ));
}

#[test]
fn suffixed_reference_name_already_taken_is_rejected() {
    let mut refs = reference(&[("C1", Some("ANN"), Some("LEE"), None, None)]);
    refs.with_column(Column::new("FIRST_NAME_ref".into(), ["ANNE"]))
        .unwrap();
    let subs = submissions(&[("S1", Some("ANN"), Some("LEE"), None, None)]);
    let err = DataFrameMatcher::new(subs, refs, config()).unwrap_err();
    assert!(matches!(
        err,
        MatchError::ColumnCollision { table: "reference", ref column } if column == "FIRST_NAME_ref"
    ));
}

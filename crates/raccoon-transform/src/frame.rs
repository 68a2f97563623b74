//! DataFrame construction helpers.
//!
//! The matcher reads demographics out of a frame once, works on plain
//! records, and writes derived columns back with the helpers here.

use std::borrow::Cow;

use chrono::NaiveDate;
use polars::prelude::{
    Column, DataFrame, DataType, IntoColumn, NamedFrom, PlSmallStr, PolarsResult,
    Series,
};
use raccoon_model::columns::{
    COLLECTION_DATE_CLEAN, DOB_CLEAN, FIRST_NAME_CLEAN, INTERNAL_CREATE_DATE, LAST_NAME_CLEAN,
    SUBMISSION_NUMBER,
};
use tracing::debug;

use crate::normalization::date::{any_to_date, epoch_days};
use crate::normalization::name::clean_name;
use crate::polars_utils::any_to_string_non_empty;

/// Normalized demographic fields of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanDemographics {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub collection_date: Option<NaiveDate>,
}

impl CleanDemographics {
    /// All four fields are present.
    pub fn is_complete(&self) -> bool {
        self.first_name.is_some()
            && self.last_name.is_some()
            && self.dob.is_some()
            && self.collection_date.is_some()
    }
}

/// Read and normalize the four demographic columns of every row.
///
/// `names` are the first name, last name, date of birth and collection
/// date columns, in that order.
pub fn extract_demographics(
    df: &DataFrame,
    names: [&str; 4],
) -> PolarsResult<Vec<CleanDemographics>> {
    let [first, last, dob, collected] = names;
    let first = df.column(first)?;
    let last = df.column(last)?;
    let dob = date_source(df.column(dob)?)?;
    let collected = date_source(df.column(collected)?)?;

    let mut records = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        records.push(CleanDemographics {
            first_name: clean_name(any_to_string_non_empty(first.get(idx)?).as_deref()),
            last_name: clean_name(any_to_string_non_empty(last.get(idx)?).as_deref()),
            dob: any_to_date(dob.get(idx)?),
            collection_date: any_to_date(collected.get(idx)?),
        });
    }
    Ok(records)
}

/// Datetime columns are truncated to dates up front so cells read as `Date`.
fn date_source(column: &Column) -> PolarsResult<Cow<'_, Column>> {
    if matches!(column.dtype(), DataType::Datetime(_, _)) {
        Ok(Cow::Owned(column.cast(&DataType::Date)?))
    } else {
        Ok(Cow::Borrowed(column))
    }
}

/// Derived column of cleaned names read from `column`.
pub fn clean_name_column(column: &Column, name: &str) -> PolarsResult<Column> {
    let mut cleaned = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        cleaned.push(clean_name(any_to_string_non_empty(column.get(idx)?).as_deref()));
    }
    Ok(Column::new(name.into(), cleaned))
}

/// Derived `Date` column of dates parsed from `column`.
pub fn parse_date_column(column: &Column, name: &str) -> PolarsResult<Column> {
    let source = date_source(column)?;
    let mut dates = Vec::with_capacity(column.len());
    for idx in 0..source.len() {
        dates.push(any_to_date(source.get(idx)?));
    }
    date_column(name, &dates)
}

/// Build a polars `Date` column from calendar dates.
pub fn date_column(name: &str, dates: &[Option<NaiveDate>]) -> PolarsResult<Column> {
    let days: Vec<Option<i32>> = dates.iter().map(|date| date.map(epoch_days)).collect();
    Series::new(name.into(), days)
        .cast(&DataType::Date)
        .map(IntoColumn::into_column)
}

/// The four `*_clean` columns for a set of normalized records.
pub fn demographic_columns(records: &[CleanDemographics]) -> PolarsResult<Vec<Column>> {
    let first: Vec<Option<&str>> = records.iter().map(|r| r.first_name.as_deref()).collect();
    let last: Vec<Option<&str>> = records.iter().map(|r| r.last_name.as_deref()).collect();
    let dob: Vec<Option<NaiveDate>> = records.iter().map(|r| r.dob).collect();
    let collected: Vec<Option<NaiveDate>> = records.iter().map(|r| r.collection_date).collect();
    Ok(vec![
        Column::new(FIRST_NAME_CLEAN.into(), first),
        Column::new(LAST_NAME_CLEAN.into(), last),
        date_column(DOB_CLEAN, &dob)?,
        date_column(COLLECTION_DATE_CLEAN, &collected)?,
    ])
}

/// Attach `first_name_clean`, `last_name_clean`, `dob_clean` and
/// `collection_date_clean` to a frame.
pub fn normalize_demographics(df: &DataFrame, names: [&str; 4]) -> PolarsResult<DataFrame> {
    let records = extract_demographics(df, names)?;
    let mut normalized = df.clone();
    for column in demographic_columns(&records)? {
        normalized.with_column(column)?;
    }
    Ok(normalized)
}

/// Rename columns of `right` that collide with `left_names`, appending `suffix`.
pub fn suffix_collisions(
    left_names: &[PlSmallStr],
    mut right: DataFrame,
    suffix: &str,
) -> PolarsResult<DataFrame> {
    let colliding: Vec<PlSmallStr> = right
        .get_column_names_owned()
        .into_iter()
        .filter(|name| left_names.contains(name))
        .collect();
    for name in colliding {
        let renamed = format!("{name}{suffix}");
        right.rename(name.as_str(), renamed.into())?;
    }
    Ok(right)
}

/// Stack frames vertically, filling columns a frame lacks with nulls.
///
/// Columns appear in first-seen order and take the data type of their
/// first occurrence.
pub fn align_frames(frames: &[DataFrame]) -> PolarsResult<DataFrame> {
    let mut schema: Vec<(PlSmallStr, DataType)> = Vec::new();
    for frame in frames {
        for column in frame.get_columns() {
            if !schema.iter().any(|(name, _)| name == column.name()) {
                schema.push((column.name().clone(), column.dtype().clone()));
            }
        }
    }

    let mut stacked: Option<DataFrame> = None;
    for frame in frames {
        let mut columns = Vec::with_capacity(schema.len());
        for (name, dtype) in &schema {
            let column = match frame.column(name.as_str()) {
                Ok(column) => column.cast(dtype)?,
                Err(_) => Column::full_null(name.clone(), frame.height(), dtype),
            };
            columns.push(column);
        }
        let aligned = DataFrame::new(columns)?;
        match stacked.as_mut() {
            Some(existing) => {
                existing.vstack_mut(&aligned)?;
            }
            None => stacked = Some(aligned),
        }
    }
    Ok(stacked.unwrap_or_else(DataFrame::empty))
}

/// Stamp a raw submission table for archival.
///
/// Prepends `submission_number` (a copy of `key`) and
/// `internal_create_date` ahead of the original columns. Existing columns
/// with either stamp name are replaced by the stamp.
pub fn save_raw_values(df: &DataFrame, key: &str, created: NaiveDate) -> PolarsResult<DataFrame> {
    let submission_number = df
        .column(key)?
        .clone()
        .with_name(SUBMISSION_NUMBER.into());
    let created_dates = vec![Some(created); df.height()];
    let mut columns = vec![
        submission_number,
        date_column(INTERNAL_CREATE_DATE, &created_dates)?,
    ];
    columns.extend(
        df.get_columns()
            .iter()
            .filter(|column| {
                !matches!(column.name().as_str(), SUBMISSION_NUMBER | INTERNAL_CREATE_DATE)
            })
            .cloned(),
    );
    debug!(rows = df.height(), key, "stamped raw submission values");
    DataFrame::new(columns)
}

/// Null-safe string for a cell, for logging and keys.
pub fn cell_string(column: &Column, idx: usize) -> PolarsResult<Option<String>> {
    Ok(any_to_string_non_empty(column.get(idx)?))
}

//! Heterogeneous date parsing and date distances.
//!
//! Source systems send dates in whatever shape their export produced.
//! [`parse_date`] tries a fixed list of formats in priority order and
//! takes the first that consumes the whole value; anything else is null.
//! Spreadsheet serial numbers (`"44115"`) are rejected rather than guessed.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use polars::prelude::AnyValue;

use crate::polars_utils::any_to_string;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, Clone, Copy)]
enum DatePattern {
    Date(&'static str),
    DateTime(&'static str),
}

/// Formats tried in order; the first full match wins.
const DATE_PATTERNS: [DatePattern; 10] = [
    DatePattern::Date("%Y-%m-%d"),
    DatePattern::DateTime("%Y-%m-%d %H:%M:%S"),
    DatePattern::DateTime("%Y-%m-%dT%H:%M:%S"),
    // locale m/d/y and date-time representations
    DatePattern::Date("%D"),
    DatePattern::DateTime("%c"),
    DatePattern::Date("%m-%d-%Y"),
    DatePattern::Date("%d-%m-%Y"),
    DatePattern::Date("%m/%d/%Y"),
    DatePattern::Date("%d/%m/%Y"),
    DatePattern::Date("%B %d, %Y"),
];

impl DatePattern {
    fn parse(self, value: &str) -> Option<NaiveDate> {
        match self {
            DatePattern::Date(format) => NaiveDate::parse_from_str(value, format).ok(),
            DatePattern::DateTime(format) => NaiveDateTime::parse_from_str(value, format)
                .ok()
                .map(|dt| dt.date()),
        }
    }
}

/// Parse a textual date into a calendar date.
///
/// Returns `None` for empty values, all-digit values (spreadsheet serial
/// dates are unsupported) and anything no known format accepts.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use raccoon_transform::parse_date;
///
/// assert_eq!(parse_date("2022-12-27 08:26:49"), NaiveDate::from_ymd_opt(2022, 12, 27));
/// assert_eq!(parse_date("2/16/2022"), NaiveDate::from_ymd_opt(2022, 2, 16));
/// assert_eq!(parse_date("44115"), None);
/// ```
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    DATE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.parse(trimmed))
}

/// Convert a cell value to a calendar date.
///
/// Native `Date` values are used as they are. Datetime columns are expected
/// to be cast to `Date` before cells are read (see
/// [`crate::frame::extract_demographics`]). Strings go through
/// [`parse_date`]; any other value is stringified first.
pub fn any_to_date(value: AnyValue<'_>) -> Option<NaiveDate> {
    match value {
        AnyValue::Null => None,
        AnyValue::Date(days) => date_from_epoch_days(days),
        AnyValue::String(s) => parse_date(s),
        AnyValue::StringOwned(s) => parse_date(&s),
        other => parse_date(&any_to_string(other)),
    }
}

/// Calendar date for a count of days since 1970-01-01.
pub fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

/// Days since 1970-01-01, the physical representation of a polars `Date`.
pub fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Absolute number of calendar days between two dates.
pub fn calendar_day_diff(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days().abs()
}

/// Absolute number of business days between two dates.
///
/// Counts the Monday-Friday dates in the half-open interval from the
/// earlier date up to, but excluding, the later one. No holiday calendar
/// is applied.
pub fn business_day_diff(a: NaiveDate, b: NaiveDate) -> i64 {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    let full_weeks = (end - start).num_days() / 7;
    let mut count = full_weeks * 5;
    // full_weeks * 7 never passes `end`
    let Some(mut day) = start.checked_add_days(Days::new((full_weeks * 7) as u64)) else {
        return count;
    };
    while day < end {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            count += 1;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    count
}

//! Exact demographic matching.
//!
//! A submission matches a reference row when cleaned first name, cleaned
//! last name and date of birth are all equal. Among several such rows the
//! one whose collection date is closest wins; remaining ties go to the
//! chronologically earlier reference collection date, then to the earlier
//! reference row. Reference rows without a collection date rank last.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use raccoon_transform::{CleanDemographics, calendar_day_diff};

/// Result of the exact stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExactOutcome {
    /// `(submission_row, reference_row)` pairs in submission order.
    pub matched: Vec<(usize, usize)>,
    /// Submission rows with no exact hit, handed to fuzzy matching.
    pub unmatched: Vec<usize>,
}

type ExactKey<'a> = (&'a str, &'a str, NaiveDate);

fn exact_key(record: &CleanDemographics) -> Option<ExactKey<'_>> {
    Some((
        record.first_name.as_deref()?,
        record.last_name.as_deref()?,
        record.dob?,
    ))
}

/// Match complete submissions against reference rows on name and dob.
pub fn match_exact(
    submissions: &[CleanDemographics],
    references: &[CleanDemographics],
    rows: &[usize],
) -> ExactOutcome {
    let mut index: HashMap<ExactKey<'_>, Vec<usize>> = HashMap::new();
    for (row, record) in references.iter().enumerate() {
        if let Some(key) = exact_key(record) {
            index.entry(key).or_default().push(row);
        }
    }

    let mut outcome = ExactOutcome::default();
    for &row in rows {
        let submission = &submissions[row];
        let best = exact_key(submission)
            .and_then(|key| index.get(&key))
            .and_then(|hits| closest_reference(submission.collection_date, references, hits));
        match best {
            Some(reference) => outcome.matched.push((row, reference)),
            None => outcome.unmatched.push(row),
        }
    }
    outcome
}

fn closest_reference(
    collected: Option<NaiveDate>,
    references: &[CleanDemographics],
    hits: &[usize],
) -> Option<usize> {
    hits.iter().copied().min_by(|&a, &b| {
        let date_a = references[a].collection_date;
        let date_b = references[b].collection_date;
        let distance = |date: Option<NaiveDate>| Some(calendar_day_diff(collected?, date?));
        nulls_last(distance(date_a), distance(date_b))
            .then_with(|| nulls_last(date_a, date_b))
            .then_with(|| a.cmp(&b))
    })
}

/// Ascending order with `None` after every value.
pub(crate) fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

//! Name similarity scoring for candidate pairs.

use chrono::NaiveDate;
use raccoon_model::DateDistance;
use raccoon_transform::{CleanDemographics, business_day_diff, calendar_day_diff};

use crate::fuzz::ratio;

/// The four name ratios of one submission/reference pair.
///
/// The reverse ratios compare the submission's first name with the
/// reference's last name and vice versa, catching records whose name
/// fields were transposed upstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameScores {
    pub first_name: f64,
    pub last_name: f64,
    pub reverse_first_name: f64,
    pub reverse_last_name: f64,
}

impl NameScores {
    pub fn compute(submission: &CleanDemographics, reference: &CleanDemographics) -> Self {
        let sub_first = submission.first_name.as_deref();
        let sub_last = submission.last_name.as_deref();
        let ref_first = reference.first_name.as_deref();
        let ref_last = reference.last_name.as_deref();
        Self {
            first_name: ratio(sub_first, ref_first),
            last_name: ratio(sub_last, ref_last),
            reverse_first_name: ratio(sub_first, ref_last),
            reverse_last_name: ratio(sub_last, ref_first),
        }
    }

    pub fn match_ratio(&self) -> f64 {
        (self.first_name + self.last_name) / 2.0
    }

    pub fn reverse_match_ratio(&self) -> f64 {
        (self.reverse_first_name + self.reverse_last_name) / 2.0
    }

    pub fn max_ratio(&self) -> f64 {
        self.match_ratio().max(self.reverse_match_ratio())
    }

    /// Either orientation reaches the threshold.
    pub fn qualifies(&self, threshold: f64) -> bool {
        self.match_ratio() >= threshold || self.reverse_match_ratio() >= threshold
    }
}

/// A scored reference row for one submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Row of the reference table.
    pub reference: usize,
    pub scores: NameScores,
    /// Absolute calendar days between collection dates, when both are known.
    pub day_diff: Option<i64>,
    /// Absolute business days between collection dates, when both are known.
    pub business_day_diff: Option<i64>,
}

impl Candidate {
    pub fn new(reference: usize, submission: &CleanDemographics, record: &CleanDemographics) -> Self {
        let dates = date_pair(submission.collection_date, record.collection_date);
        Self {
            reference,
            scores: NameScores::compute(submission, record),
            day_diff: dates.map(|(a, b)| calendar_day_diff(a, b)),
            business_day_diff: dates.map(|(a, b)| business_day_diff(a, b)),
        }
    }

    pub fn distance(&self, metric: DateDistance) -> Option<i64> {
        match metric {
            DateDistance::Days => self.day_diff,
            DateDistance::BusinessDays => self.business_day_diff,
        }
    }
}

fn date_pair(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<(NaiveDate, NaiveDate)> {
    Some((a?, b?))
}

/// Score every blocked reference row against a submission.
pub fn score_candidates(
    submission: &CleanDemographics,
    references: &[CleanDemographics],
    rows: &[usize],
) -> Vec<Candidate> {
    rows.iter()
        .map(|&row| Candidate::new(row, submission, &references[row]))
        .collect()
}

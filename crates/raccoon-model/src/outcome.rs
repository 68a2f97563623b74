//! Terminal outcomes of a match run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four mutually exclusive buckets every submission ends up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    ExactMatched,
    FuzzyMatched,
    FuzzyUnmatched,
    NoDemo,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::ExactMatched,
        Bucket::FuzzyMatched,
        Bucket::FuzzyUnmatched,
        Bucket::NoDemo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::ExactMatched => "exact_matched",
            Bucket::FuzzyMatched => "fuzzy_matched",
            Bucket::FuzzyUnmatched => "fuzzy_unmatched",
            Bucket::NoDemo => "no_demo",
        }
    }

    /// Whether submissions in this bucket were linked to a reference record.
    pub fn is_match(self) -> bool {
        matches!(self, Bucket::ExactMatched | Bucket::FuzzyMatched)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row counts per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    pub exact_matched: usize,
    pub fuzzy_matched: usize,
    pub fuzzy_unmatched: usize,
    pub no_demo: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::ExactMatched => self.exact_matched,
            Bucket::FuzzyMatched => self.fuzzy_matched,
            Bucket::FuzzyUnmatched => self.fuzzy_unmatched,
            Bucket::NoDemo => self.no_demo,
        }
    }

    pub fn total(&self) -> usize {
        Bucket::ALL.iter().map(|bucket| self.get(*bucket)).sum()
    }

    pub fn matched(&self) -> usize {
        self.exact_matched + self.fuzzy_matched
    }
}

/// Metric used to bound the distance between two collection dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateDistance {
    /// Absolute calendar-day difference.
    Days,
    /// Monday-Friday dates between the two dates.
    BusinessDays,
}

impl DateDistance {
    pub fn as_str(self) -> &'static str {
        match self {
            DateDistance::Days => "day_max",
            DateDistance::BusinessDays => "business_day_max",
        }
    }
}

/// How an exact match was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExactMatchBasis {
    /// Submission key equal to a reference identifier column.
    Identifier,
    /// Cleaned first name, last name and date of birth all equal.
    Demographics,
}

impl ExactMatchBasis {
    pub fn as_str(self) -> &'static str {
        match self {
            ExactMatchBasis::Identifier => "identifier",
            ExactMatchBasis::Demographics => "demographics",
        }
    }
}

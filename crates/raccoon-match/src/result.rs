//! The four outcome tables of a match run.

use polars::prelude::{DataFrame, PolarsResult};
use raccoon_model::{Bucket, BucketCounts};
use raccoon_transform::align_frames;

/// Outcome tables, accessed by name.
///
/// Every submission row appears in exactly one table, and each table
/// keeps the submission table's row order.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub exact_matched: DataFrame,
    pub fuzzy_matched: DataFrame,
    pub fuzzy_unmatched: DataFrame,
    pub no_demo: DataFrame,
}

impl MatchResult {
    pub fn bucket(&self, bucket: Bucket) -> &DataFrame {
        match bucket {
            Bucket::ExactMatched => &self.exact_matched,
            Bucket::FuzzyMatched => &self.fuzzy_matched,
            Bucket::FuzzyUnmatched => &self.fuzzy_unmatched,
            Bucket::NoDemo => &self.no_demo,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &DataFrame)> {
        Bucket::ALL.into_iter().map(|bucket| (bucket, self.bucket(bucket)))
    }

    pub fn counts(&self) -> BucketCounts {
        BucketCounts {
            exact_matched: self.exact_matched.height(),
            fuzzy_matched: self.fuzzy_matched.height(),
            fuzzy_unmatched: self.fuzzy_unmatched.height(),
            no_demo: self.no_demo.height(),
        }
    }

    /// Exact and fuzzy matches stacked into one table.
    ///
    /// Score columns are null on exact rows and `exact_match_basis` is
    /// null on fuzzy rows.
    pub fn all_matched(&self) -> PolarsResult<DataFrame> {
        align_frames(&[self.exact_matched.clone(), self.fuzzy_matched.clone()])
    }
}

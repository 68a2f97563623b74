//! Demographic completeness split.

use raccoon_transform::CleanDemographics;

/// Submission rows partitioned by demographic completeness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemographicSplit {
    /// Rows with first name, last name, dob and collection date.
    pub complete: Vec<usize>,
    /// Rows missing at least one of them; these go to `no_demo`.
    pub incomplete: Vec<usize>,
}

/// Partition `rows` of `records`, keeping row order within each side.
pub fn split_demographics(
    records: &[CleanDemographics],
    rows: impl IntoIterator<Item = usize>,
) -> DemographicSplit {
    let mut split = DemographicSplit::default();
    for row in rows {
        if records[row].is_complete() {
            split.complete.push(row);
        } else {
            split.incomplete.push(row);
        }
    }
    split
}

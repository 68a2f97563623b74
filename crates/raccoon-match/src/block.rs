//! Blocking on date of birth.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use raccoon_transform::CleanDemographics;

/// Reference rows grouped by cleaned date of birth.
#[derive(Debug, Default)]
pub struct DobBlocks {
    blocks: BTreeMap<NaiveDate, Vec<usize>>,
}

impl DobBlocks {
    /// Group reference rows; rows without a dob belong to no block.
    pub fn build(references: &[CleanDemographics]) -> Self {
        let mut blocks: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        for (row, record) in references.iter().enumerate() {
            if let Some(dob) = record.dob {
                blocks.entry(dob).or_default().push(row);
            }
        }
        Self { blocks }
    }

    /// Reference rows sharing `dob`, in reference order.
    pub fn candidates(&self, dob: Option<NaiveDate>) -> &[usize] {
        dob.and_then(|dob| self.blocks.get(&dob))
            .map_or(&[], Vec::as_slice)
    }

    /// Size of the largest block, the width that bounds scoring cost.
    pub fn widest(&self) -> usize {
        self.blocks.values().map(Vec::len).max().unwrap_or(0)
    }
}

/// Left join of submission rows to same-dob reference rows.
///
/// Every submission row is kept, with an empty candidate list when no
/// reference row shares its date of birth.
pub fn block_by_dob<'a>(
    submissions: &[CleanDemographics],
    blocks: &'a DobBlocks,
    rows: &[usize],
) -> Vec<(usize, &'a [usize])> {
    rows.iter()
        .map(|&row| (row, blocks.candidates(submissions[row].dob)))
        .collect()
}

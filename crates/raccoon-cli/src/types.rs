use std::path::PathBuf;

use raccoon_model::{BucketCounts, MatchConfig};
use serde::Serialize;

/// What a `raccoon match` run did, printed as a table and saved as
/// `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub submissions: PathBuf,
    pub reference: PathBuf,
    pub output_dir: PathBuf,
    pub config: MatchConfig,
    pub counts: BucketCounts,
    pub files: Vec<PathBuf>,
    pub dry_run: bool,
    pub duration_ms: u128,
}

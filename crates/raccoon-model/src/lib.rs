//! Data model for submission-to-case record linkage.
//!
//! - **config**: column bindings and the consolidated [`MatchConfig`]
//! - **outcome**: the four terminal outcome buckets
//! - **columns**: names of the derived columns the matcher attaches
//! - **error**: configuration error taxonomy

pub mod columns;
pub mod config;
pub mod error;
pub mod outcome;

pub use config::{ColumnBinding, DemographicField, MatchConfig, ResolvedBinding, ResolvedColumns};
pub use error::{MatchError, Result};
pub use outcome::{Bucket, BucketCounts, DateDistance, ExactMatchBasis};

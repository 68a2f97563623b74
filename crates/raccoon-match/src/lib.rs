//! Record linkage of case submissions against a registry.
//!
//! A match run moves every submission through these stages:
//!
//! - **identifier**: optional direct hits on accession/order identifiers
//! - **split**: rows missing any demographic go to `no_demo`
//! - **exact**: equal cleaned names and dob, closest collection date wins
//! - **block**: remaining rows meet only same-dob reference rows
//! - **score**: forward and reversed name ratios per candidate
//! - **select**: closest qualifying candidate within the date caps
//!
//! [`DataFrameMatcher`] runs the stages over polars tables and returns a
//! [`MatchResult`] with one table per outcome bucket.

pub mod block;
pub mod exact;
pub mod fuzz;
pub mod identifier;
pub mod matcher;
pub mod result;
pub mod score;
pub mod select;
pub mod split;

pub use matcher::DataFrameMatcher;
pub use result::MatchResult;
pub use score::{Candidate, NameScores};
pub use select::{SelectOptions, Selection};

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::config::DemographicField;

/// Errors raised while configuring a match run.
///
/// Data-quality conditions (unparseable dates, empty names, no candidate)
/// are never errors; they are routed to an outcome bucket instead.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("no column binding given for {field}: set a shared name or both source and reference names")]
    MissingBinding { field: DemographicField },

    #[error("{table} table is missing required column {column:?}")]
    MissingColumn { table: &'static str, column: String },

    #[error("similarity threshold {0} is outside 0..=100")]
    InvalidThreshold(f64),

    #[error("key column {column:?} is not unique ({unique} distinct values over {rows} rows)")]
    DuplicateKey {
        column: String,
        rows: usize,
        unique: usize,
    },

    #[error("{table} column {column:?} collides with a column the matcher adds to its output")]
    ColumnCollision { table: &'static str, column: String },

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl MatchError {
    pub fn missing_column(table: &'static str, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            table,
            column: column.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;

//! Error types for table ingestion and output.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while reading or writing tables.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Failed to open, create or write a file or directory.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Polars failed to parse or serialize a table.
    #[error("failed to process CSV {path}: {source}")]
    Polars {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    /// Required columns are absent from a table.
    #[error("{path} is missing required columns: {}", columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

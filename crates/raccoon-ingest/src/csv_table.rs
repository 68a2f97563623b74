//! CSV tables in and out.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::{CsvReadOptions, CsvWriter, DataFrame, SerReader, SerWriter};
use raccoon_match::MatchResult;
use tracing::{debug, info};

use crate::error::{IngestError, Result};

/// Read a CSV file with a header row, every column as a string.
///
/// Names and dates are normalized by the matcher and identifiers stay
/// opaque, so no type inference is done here.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    let polars_err = |source| IngestError::Polars {
        path: path.to_path_buf(),
        source,
    };
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(polars_err)?
        .finish()
        .map_err(polars_err)?;
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read table"
    );
    Ok(df)
}

/// Fail with every absent column named at once.
pub fn require_columns(df: &DataFrame, path: &Path, required: &[&str]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| df.column(name).is_err())
        .map(|name| (*name).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        })
    }
}

/// Write a table as CSV with a header row, creating parent directories.
pub fn write_table(df: &DataFrame, path: &Path) -> Result<()> {
    let io_err = |source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut file = File::create(path).map_err(io_err)?;
    let mut df = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|source| IngestError::Polars {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), rows = df.height(), "wrote table");
    Ok(())
}

/// Write the four outcome tables as `<bucket>.csv` under `dir`.
///
/// Returns the written paths in bucket order.
pub fn write_outcomes(result: &MatchResult, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(4);
    for (bucket, table) in result.iter() {
        let path = dir.join(format!("{}.csv", bucket.as_str()));
        write_table(table, &path)?;
        written.push(path);
    }
    info!(dir = %dir.display(), files = written.len(), "wrote outcome tables");
    Ok(written)
}

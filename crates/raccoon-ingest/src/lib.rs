//! Table I/O around the match engine.
//!
//! Submissions and registry extracts arrive as CSV; outcome tables leave
//! as one CSV per bucket.

pub mod csv_table;
pub mod error;

pub use csv_table::{read_table, require_columns, write_outcomes, write_table};
pub use error::{IngestError, Result};

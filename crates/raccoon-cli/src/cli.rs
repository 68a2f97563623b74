//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use raccoon_model::ColumnBinding;

#[derive(Parser)]
#[command(
    name = "raccoon",
    version,
    about = "Link case submissions to surveillance registry records",
    long_about = "Link case submissions to surveillance registry records.\n\n\
                  Submissions are matched on identifiers, then exactly on name and\n\
                  date of birth, then fuzzily on name within a date-of-birth block.\n\
                  Every submission lands in exactly one outcome table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow names, birth dates and keys in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match a submission table against a reference table.
    Match(MatchArgs),
}

#[derive(Parser)]
pub struct MatchArgs {
    /// Submission CSV (lab or public-health reports).
    #[arg(value_name = "SUBMISSIONS")]
    pub submissions: PathBuf,

    /// Reference CSV (registry case extract).
    #[arg(value_name = "REFERENCE")]
    pub reference: PathBuf,

    /// First name column, as NAME or SOURCE:REFERENCE.
    #[arg(long = "first-name", value_name = "COLUMN", value_parser = parse_binding)]
    pub first_name: Option<ColumnBinding>,

    /// Last name column, as NAME or SOURCE:REFERENCE.
    #[arg(long = "last-name", value_name = "COLUMN", value_parser = parse_binding)]
    pub last_name: Option<ColumnBinding>,

    /// Date of birth column, as NAME or SOURCE:REFERENCE.
    #[arg(long = "dob", value_name = "COLUMN", value_parser = parse_binding)]
    pub dob: Option<ColumnBinding>,

    /// Specimen collection date column, as NAME or SOURCE:REFERENCE.
    #[arg(long = "collection-date", value_name = "COLUMN", value_parser = parse_binding)]
    pub collection_date: Option<ColumnBinding>,

    /// Unique submission key column (default: row number).
    #[arg(long = "key", value_name = "COLUMN")]
    pub key: Option<String>,

    /// Minimum name similarity for a fuzzy match, 0-100 (default: 80).
    #[arg(long = "threshold", value_name = "SCORE")]
    pub threshold: Option<f64>,

    /// Maximum calendar days between collection dates of a fuzzy match.
    #[arg(long = "day-max", value_name = "DAYS")]
    pub day_max: Option<u32>,

    /// Maximum business days between collection dates of a fuzzy match.
    #[arg(long = "business-day-max", value_name = "DAYS")]
    pub business_day_max: Option<u32>,

    /// Reference column holding accession or order identifiers (repeatable).
    #[arg(long = "identifier-column", value_name = "COLUMN")]
    pub identifier_columns: Vec<String>,

    /// Reference column to carry into the output (repeatable; default: all).
    #[arg(long = "reference-column", value_name = "COLUMN")]
    pub reference_columns: Vec<String>,

    /// JSON match configuration; flags given here override its values.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output directory for outcome tables.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "matches")]
    pub output_dir: PathBuf,

    /// Match and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Also write the stamped raw submissions as raw_submissions.csv.
    #[arg(long = "archive-raw")]
    pub archive_raw: bool,
}

/// Parse `NAME` into a shared binding and `SOURCE:REFERENCE` into a pair.
pub fn parse_binding(value: &str) -> Result<ColumnBinding, String> {
    match value.split_once(':') {
        Some((source, reference)) if !source.is_empty() && !reference.is_empty() => {
            Ok(ColumnBinding::pair(source, reference))
        }
        Some(_) => Err(format!(
            "expected SOURCE:REFERENCE with both names, got {value:?}"
        )),
        None if value.is_empty() => Err("column name is empty".to_string()),
        None => Ok(ColumnBinding::shared(value)),
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

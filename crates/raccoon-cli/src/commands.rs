use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use polars::prelude::DataFrame;
use raccoon_ingest::{read_table, require_columns, write_outcomes, write_table};
use raccoon_match::{DataFrameMatcher, MatchResult};
use raccoon_model::MatchConfig;
use raccoon_transform::{cell_string, save_raw_values};
use tracing::{debug, info, info_span, trace};

use crate::cli::MatchArgs;
use crate::logging::redact_value;
use crate::types::MatchSummary;

pub const SUMMARY_FILE: &str = "summary.json";
pub const RAW_SUBMISSIONS_FILE: &str = "raw_submissions.csv";

pub fn run_match(args: &MatchArgs) -> Result<MatchSummary> {
    let span = info_span!("match", submissions = %args.submissions.display());
    let _guard = span.enter();
    let start = Instant::now();

    let config = build_config(args)?;
    let columns = config.validate().context("invalid match configuration")?;
    for (distance, max) in config.date_caps() {
        debug!(cap = distance.as_str(), max, "fuzzy matches bounded by collection date");
    }

    let submissions = read_table(&args.submissions).context("read submissions")?;
    let reference = read_table(&args.reference).context("read reference")?;
    let mut required: Vec<&str> = columns.source_names().to_vec();
    required.extend(config.key.as_deref());
    require_columns(&submissions, &args.submissions, &required)?;
    let mut required: Vec<&str> = columns.reference_names().to_vec();
    required.extend(config.identifier_columns.iter().map(String::as_str));
    require_columns(&reference, &args.reference, &required)?;

    let matcher =
        DataFrameMatcher::new(submissions, reference, config.clone()).context("configure matcher")?;
    let result = matcher.match_records().context("match records")?;
    trace_unlinked(&result, matcher.key())?;

    let mut files = Vec::new();
    if !args.dry_run {
        files = write_outcomes(&result, &args.output_dir).context("write outcome tables")?;
        if args.archive_raw {
            files.push(archive_raw(&matcher, &args.output_dir)?);
        }
    }

    let summary = MatchSummary {
        submissions: args.submissions.clone(),
        reference: args.reference.clone(),
        output_dir: args.output_dir.clone(),
        config,
        counts: result.counts(),
        files,
        dry_run: args.dry_run,
        duration_ms: start.elapsed().as_millis(),
    };
    if !args.dry_run {
        write_summary(&summary)?;
    }
    info!(
        matched = summary.counts.matched(),
        total = summary.counts.total(),
        duration_ms = summary.duration_ms,
        "match run finished"
    );
    Ok(summary)
}

/// Config file values first, then every flag that was given.
pub fn build_config(args: &MatchArgs) -> Result<MatchConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => MatchConfig::default(),
    };
    if let Some(binding) = &args.first_name {
        config.first_name = binding.clone();
    }
    if let Some(binding) = &args.last_name {
        config.last_name = binding.clone();
    }
    if let Some(binding) = &args.dob {
        config.dob = binding.clone();
    }
    if let Some(binding) = &args.collection_date {
        config.collection_date = binding.clone();
    }
    if let Some(key) = &args.key {
        config.key = Some(key.clone());
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if args.day_max.is_some() {
        config.day_max = args.day_max;
    }
    if args.business_day_max.is_some() {
        config.business_day_max = args.business_day_max;
    }
    if !args.identifier_columns.is_empty() {
        config.identifier_columns = args.identifier_columns.clone();
    }
    if !args.reference_columns.is_empty() {
        config.reference_columns = Some(args.reference_columns.clone());
    }
    Ok(config)
}

fn load_config(path: &Path) -> Result<MatchConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
}

fn write_summary(summary: &MatchSummary) -> Result<()> {
    let path = summary.output_dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(summary).context("serialize summary")?;
    fs::write(&path, json).with_context(|| format!("write {}", path.display()))
}

fn archive_raw(matcher: &DataFrameMatcher, dir: &Path) -> Result<PathBuf> {
    let today = Local::now().date_naive();
    let stamped = save_raw_values(matcher.submissions(), matcher.key(), today)
        .context("stamp raw submissions")?;
    let path = dir.join(RAW_SUBMISSIONS_FILE);
    write_table(&stamped, &path).context("write raw submissions")?;
    Ok(path)
}

/// Trace the keys of submissions that found no reference record.
fn trace_unlinked(result: &MatchResult, key: &str) -> Result<()> {
    if !tracing::enabled!(tracing::Level::TRACE) {
        return Ok(());
    }
    for (bucket, table) in result.iter().filter(|(bucket, _)| !bucket.is_match()) {
        trace_keys(table, key, bucket.as_str())?;
    }
    Ok(())
}

fn trace_keys(table: &DataFrame, key: &str, bucket: &str) -> Result<()> {
    let column = table.column(key)?;
    for row in 0..table.height() {
        let value = cell_string(column, row)?.unwrap_or_default();
        trace!(bucket, key = redact_value(&value), "submission not linked");
    }
    Ok(())
}

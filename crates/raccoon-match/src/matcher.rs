//! The match pipeline entry point.

use std::collections::HashSet;
use std::time::Instant;

use polars::prelude::{
    Column, DataFrame, IdxCa, IdxSize, LazyFrame, NamedFrom, NewChunkedArray, PlSmallStr,
    PolarsResult,
};
use raccoon_model::columns::{
    BUSINESS_DAY_DIFF, CLEAN_COLUMNS, DAY_DIFF, EXACT_MATCH_BASIS, FIRST_NAME_RESULT, LAST_NAME_RESULT,
    MATCH_RATIO, MAX_RATIO, REFERENCE_SUFFIX, REVERSE_FIRST_NAME_RESULT, REVERSE_LAST_NAME_RESULT,
    REVERSE_MATCH_RATIO, SCORE_COLUMNS, SYNTHETIC_KEY,
};
use raccoon_model::{ExactMatchBasis, MatchConfig, MatchError, ResolvedColumns, Result};
use raccoon_transform::{
    CleanDemographics, cell_string, demographic_columns, extract_demographics, suffix_collisions,
};
use tracing::{debug, info, info_span, trace};

use crate::block::{DobBlocks, block_by_dob};
use crate::exact::match_exact;
use crate::identifier::{IdentifierIndex, match_identifiers};
use crate::result::MatchResult;
use crate::score::{Candidate, score_candidates};
use crate::select::{SelectOptions, Selection, select_best};
use crate::split::split_demographics;

const SUBMISSION_TABLE: &str = "submission";
const REFERENCE_TABLE: &str = "reference";

/// Links a submission table to a reference table.
///
/// Construction validates the configuration against both tables; once a
/// matcher exists, [`match_records`](Self::match_records) only fails on
/// internal polars errors.
#[derive(Debug, Clone)]
pub struct DataFrameMatcher {
    submissions: DataFrame,
    reference: DataFrame,
    config: MatchConfig,
    columns: ResolvedColumns,
    key: String,
}

impl DataFrameMatcher {
    /// Validate `config` and prepare both tables for matching.
    ///
    /// Synthesizes a `__key__` row index when no key column is configured
    /// and narrows the reference table when `reference_columns` is set.
    ///
    /// # Errors
    ///
    /// Fails on unset bindings, an out-of-range threshold, a missing
    /// column on either side, or a key column with repeated values. Also
    /// fails when an input column would clash with a derived output column.
    pub fn new(submissions: DataFrame, reference: DataFrame, config: MatchConfig) -> Result<Self> {
        let columns = config.validate()?;

        require_columns(&submissions, SUBMISSION_TABLE, columns.source_names())?;
        require_columns(&reference, REFERENCE_TABLE, columns.reference_names())?;
        require_columns(
            &reference,
            REFERENCE_TABLE,
            config.identifier_columns.iter().map(String::as_str),
        )?;

        let (submissions, key) = match config.key.as_deref() {
            Some(key) => {
                require_columns(&submissions, SUBMISSION_TABLE, [key])?;
                require_unique(&submissions, key)?;
                (submissions, key.to_string())
            }
            None => (with_row_key(submissions)?, SYNTHETIC_KEY.to_string()),
        };

        let reference = match config.reference_columns.as_deref() {
            Some(keep) => narrow_reference(&reference, keep, &columns, &config.identifier_columns)?,
            None => reference,
        };
        reject_collisions(&submissions, &reference)?;

        debug!(
            submissions = submissions.height(),
            reference = reference.height(),
            key = %key,
            "matcher configured"
        );
        Ok(Self {
            submissions,
            reference,
            config,
            columns,
            key,
        })
    }

    /// Collect lazy inputs once and build a matcher from them.
    pub fn from_lazy(
        submissions: LazyFrame,
        reference: LazyFrame,
        config: MatchConfig,
    ) -> Result<Self> {
        Self::new(submissions.collect()?, reference.collect()?, config)
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Name of the submission identity column.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Submission table, including a synthesized key if one was added.
    pub fn submissions(&self) -> &DataFrame {
        &self.submissions
    }

    /// Reference table after column narrowing.
    pub fn reference(&self) -> &DataFrame {
        &self.reference
    }

    /// Route every submission to exactly one outcome table.
    pub fn match_records(&self) -> Result<MatchResult> {
        let span = info_span!(
            "match_records",
            submissions = self.submissions.height(),
            reference = self.reference.height(),
            threshold = self.config.threshold
        );
        let _guard = span.enter();
        let start = Instant::now();

        let (subs, refs) = info_span!("normalize").in_scope(|| -> PolarsResult<_> {
            Ok((
                extract_demographics(&self.submissions, self.columns.source_names())?,
                extract_demographics(&self.reference, self.columns.reference_names())?,
            ))
        })?;

        let identified = info_span!("identifier").in_scope(|| self.identify())?;
        let identified_rows: HashSet<usize> = identified.iter().map(|(row, _)| *row).collect();

        let split = split_demographics(
            &subs,
            (0..subs.len()).filter(|row| !identified_rows.contains(row)),
        );
        debug!(
            complete = split.complete.len(),
            incomplete = split.incomplete.len(),
            "split on demographic completeness"
        );

        let exact = info_span!("exact").in_scope(|| match_exact(&subs, &refs, &split.complete));
        debug!(
            matched = exact.matched.len(),
            unmatched = exact.unmatched.len(),
            "exact demographic matching"
        );

        let (fuzzy_matched, fuzzy_unmatched) =
            info_span!("fuzzy").in_scope(|| self.fuzzy(&subs, &refs, &exact.unmatched));

        let mut exact_pairs: Vec<(usize, usize, ExactMatchBasis)> = identified
            .into_iter()
            .map(|(row, reference)| (row, reference, ExactMatchBasis::Identifier))
            .chain(
                exact
                    .matched
                    .into_iter()
                    .map(|(row, reference)| (row, reference, ExactMatchBasis::Demographics)),
            )
            .collect();
        exact_pairs.sort_by_key(|(row, _, _)| *row);

        let result = info_span!("assemble").in_scope(|| -> PolarsResult<_> {
            let tables = OutputTables::new(&self.submissions, &self.reference, &subs)?;
            Ok(MatchResult {
                exact_matched: tables.exact(&exact_pairs)?,
                fuzzy_matched: tables.fuzzy(&fuzzy_matched)?,
                fuzzy_unmatched: tables.fuzzy(&fuzzy_unmatched)?,
                no_demo: tables.no_demo(&split.incomplete)?,
            })
        })?;

        let counts = result.counts();
        info!(
            exact_matched = counts.exact_matched,
            fuzzy_matched = counts.fuzzy_matched,
            fuzzy_unmatched = counts.fuzzy_unmatched,
            no_demo = counts.no_demo,
            duration_ms = start.elapsed().as_millis(),
            "match complete"
        );
        Ok(result)
    }

    fn identify(&self) -> PolarsResult<Vec<(usize, usize)>> {
        if self.config.identifier_columns.is_empty() {
            return Ok(Vec::new());
        }
        let index = IdentifierIndex::build(&self.reference, &self.config.identifier_columns)?;
        let key = self.submissions.column(&self.key)?;
        let keys = (0..self.submissions.height())
            .map(|row| cell_string(key, row))
            .collect::<PolarsResult<Vec<_>>>()?;
        let identified = match_identifiers(&keys, &index);
        debug!(matched = identified.len(), "identifier matching");
        Ok(identified)
    }

    fn fuzzy(
        &self,
        subs: &[CleanDemographics],
        refs: &[CleanDemographics],
        rows: &[usize],
    ) -> (Vec<ScoredRow>, Vec<ScoredRow>) {
        let blocks = DobBlocks::build(refs);
        debug!(widest_block = blocks.widest(), "blocked reference rows on dob");

        let options = SelectOptions {
            threshold: self.config.threshold,
            day_max: self.config.day_max,
            business_day_max: self.config.business_day_max,
        };
        let mut matched = Vec::new();
        let mut unmatched = Vec::new();
        for (row, block) in block_by_dob(subs, &blocks, rows) {
            let candidates = score_candidates(&subs[row], refs, block);
            for candidate in &candidates {
                trace!(
                    row,
                    reference = candidate.reference,
                    match_ratio = candidate.scores.match_ratio(),
                    reverse_match_ratio = candidate.scores.reverse_match_ratio(),
                    day_diff = candidate.day_diff,
                    "scored candidate"
                );
            }
            match select_best(&candidates, &options) {
                Selection::Matched(candidate) => matched.push((row, Some(candidate))),
                Selection::Unmatched(candidate) => unmatched.push((row, candidate)),
            }
        }
        debug!(
            matched = matched.len(),
            unmatched = unmatched.len(),
            "fuzzy matching"
        );
        (matched, unmatched)
    }
}

type ScoredRow = (usize, Option<Candidate>);

fn require_columns<'a>(
    df: &DataFrame,
    table: &'static str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    for name in names {
        if df.column(name).is_err() {
            return Err(MatchError::missing_column(table, name));
        }
    }
    Ok(())
}

fn require_unique(df: &DataFrame, key: &str) -> Result<()> {
    let unique = df.column(key)?.n_unique()?;
    if unique != df.height() {
        return Err(MatchError::DuplicateKey {
            column: key.to_string(),
            rows: df.height(),
            unique,
        });
    }
    Ok(())
}

fn with_row_key(mut df: DataFrame) -> Result<DataFrame> {
    if df.column(SYNTHETIC_KEY).is_ok() {
        return Err(MatchError::ColumnCollision {
            table: SUBMISSION_TABLE,
            column: SYNTHETIC_KEY.to_string(),
        });
    }
    let rows: Vec<u64> = (0..df.height() as u64).collect();
    df.insert_column(0, Column::new(SYNTHETIC_KEY.into(), rows))?;
    Ok(df)
}

/// Columns the matcher attaches next to the submission columns.
fn derived_names<'a>() -> impl Iterator<Item = &'a str> {
    CLEAN_COLUMNS
        .into_iter()
        .chain(SCORE_COLUMNS)
        .chain([EXACT_MATCH_BASIS])
}

/// Output tables hold submission, derived and suffixed reference columns
/// side by side, so none of those names may repeat.
fn reject_collisions(submissions: &DataFrame, reference: &DataFrame) -> Result<()> {
    if let Some(name) = derived_names().find(|name| submissions.column(name).is_ok()) {
        return Err(MatchError::ColumnCollision {
            table: SUBMISSION_TABLE,
            column: name.to_string(),
        });
    }
    let taken: Vec<&str> = submissions
        .get_column_names_str()
        .into_iter()
        .chain(derived_names())
        .collect();
    for name in reference.get_column_names_str() {
        if !taken.contains(&name) {
            continue;
        }
        let renamed = format!("{name}{REFERENCE_SUFFIX}");
        if taken.contains(&renamed.as_str()) || reference.column(&renamed).is_ok() {
            return Err(MatchError::ColumnCollision {
                table: REFERENCE_TABLE,
                column: renamed,
            });
        }
    }
    Ok(())
}

/// Keep `keep` plus every column the matcher reads, in first-listed order.
fn narrow_reference(
    reference: &DataFrame,
    keep: &[String],
    columns: &ResolvedColumns,
    identifiers: &[String],
) -> Result<DataFrame> {
    require_columns(reference, REFERENCE_TABLE, keep.iter().map(String::as_str))?;
    let mut selected: Vec<&str> = Vec::new();
    let wanted = keep
        .iter()
        .map(String::as_str)
        .chain(columns.reference_names())
        .chain(identifiers.iter().map(String::as_str));
    for name in wanted {
        if !selected.contains(&name) {
            selected.push(name);
        }
    }
    Ok(reference.select(selected)?)
}

/// Builds outcome tables out of row index lists.
struct OutputTables<'a> {
    submissions: &'a DataFrame,
    clean: DataFrame,
    reference: DataFrame,
}

impl<'a> OutputTables<'a> {
    fn new(
        submissions: &'a DataFrame,
        reference: &DataFrame,
        records: &[CleanDemographics],
    ) -> PolarsResult<Self> {
        let clean = DataFrame::new(demographic_columns(records)?)?;
        let mut taken: Vec<PlSmallStr> = submissions.get_column_names_owned();
        taken.extend(derived_names().map(PlSmallStr::from));
        let reference = suffix_collisions(&taken, reference.clone(), REFERENCE_SUFFIX)?;
        Ok(Self {
            submissions,
            clean,
            reference,
        })
    }

    fn no_demo(&self, rows: &[usize]) -> PolarsResult<DataFrame> {
        self.submissions.take(&row_index(rows))
    }

    fn exact(&self, pairs: &[(usize, usize, ExactMatchBasis)]) -> PolarsResult<DataFrame> {
        let rows: Vec<usize> = pairs.iter().map(|(row, _, _)| *row).collect();
        let references: Vec<Option<usize>> = pairs.iter().map(|(_, r, _)| Some(*r)).collect();
        let basis: Vec<&str> = pairs.iter().map(|(_, _, basis)| basis.as_str()).collect();
        let mut joined = self.joined(&rows, &references)?;
        joined.with_column(Column::new(EXACT_MATCH_BASIS.into(), basis))?;
        Ok(joined)
    }

    fn fuzzy(&self, scored: &[ScoredRow]) -> PolarsResult<DataFrame> {
        let rows: Vec<usize> = scored.iter().map(|(row, _)| *row).collect();
        let references: Vec<Option<usize>> = scored
            .iter()
            .map(|(_, candidate)| candidate.map(|c| c.reference))
            .collect();
        let mut joined = self.joined(&rows, &references)?;
        joined.hstack_mut(&score_columns(scored))?;
        Ok(joined)
    }

    /// Submission columns, clean columns, then the paired reference row.
    fn joined(&self, rows: &[usize], references: &[Option<usize>]) -> PolarsResult<DataFrame> {
        let index = row_index(rows);
        let mut joined = self.submissions.take(&index)?;
        joined.hstack_mut(self.clean.take(&index)?.get_columns())?;
        joined.hstack_mut(self.reference_rows(references)?.get_columns())?;
        Ok(joined)
    }

    fn reference_rows(&self, references: &[Option<usize>]) -> PolarsResult<DataFrame> {
        if references.iter().all(Option::is_none) {
            let columns = self
                .reference
                .get_columns()
                .iter()
                .map(|column| {
                    Column::full_null(column.name().clone(), references.len(), column.dtype())
                })
                .collect();
            return DataFrame::new(columns);
        }
        let index = IdxCa::from_iter_options(
            PlSmallStr::EMPTY,
            references.iter().map(|row| row.map(|row| row as IdxSize)),
        );
        self.reference.take(&index)
    }
}

fn row_index(rows: &[usize]) -> IdxCa {
    IdxCa::from_vec(
        PlSmallStr::EMPTY,
        rows.iter().map(|row| *row as IdxSize).collect(),
    )
}

fn score_columns(scored: &[ScoredRow]) -> Vec<Column> {
    vec![
        ratio_column(scored, FIRST_NAME_RESULT, |c| c.scores.first_name),
        ratio_column(scored, LAST_NAME_RESULT, |c| c.scores.last_name),
        ratio_column(scored, REVERSE_FIRST_NAME_RESULT, |c| c.scores.reverse_first_name),
        ratio_column(scored, REVERSE_LAST_NAME_RESULT, |c| c.scores.reverse_last_name),
        ratio_column(scored, MATCH_RATIO, |c| c.scores.match_ratio()),
        ratio_column(scored, REVERSE_MATCH_RATIO, |c| c.scores.reverse_match_ratio()),
        ratio_column(scored, MAX_RATIO, |c| c.scores.max_ratio()),
        distance_column(scored, DAY_DIFF, |c| c.day_diff),
        distance_column(scored, BUSINESS_DAY_DIFF, |c| c.business_day_diff),
    ]
}

fn ratio_column(scored: &[ScoredRow], name: &str, score: fn(&Candidate) -> f64) -> Column {
    let values: Vec<Option<f64>> = scored
        .iter()
        .map(|(_, candidate)| candidate.as_ref().map(score))
        .collect();
    Column::new(name.into(), values)
}

fn distance_column(
    scored: &[ScoredRow],
    name: &str,
    distance: fn(&Candidate) -> Option<i64>,
) -> Column {
    let values: Vec<Option<i64>> = scored
        .iter()
        .map(|(_, candidate)| candidate.as_ref().and_then(distance))
        .collect();
    Column::new(name.into(), values)
}

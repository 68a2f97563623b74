//! Best-candidate selection among scored, blocked reference rows.

use std::cmp::Ordering;

use raccoon_model::DateDistance;

use crate::exact::nulls_last;
use crate::score::Candidate;

/// Knobs of the selector, copied out of the match configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectOptions {
    pub threshold: f64,
    pub day_max: Option<u32>,
    pub business_day_max: Option<u32>,
}

/// Outcome of selection for one submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    /// A qualifying candidate within every configured cap.
    Matched(Candidate),
    /// Nothing accepted. Carries the candidate kept for review, if any.
    Unmatched(Option<Candidate>),
}

impl Selection {
    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            Selection::Matched(candidate) => Some(candidate),
            Selection::Unmatched(candidate) => candidate.as_ref(),
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Selection::Matched(_))
    }
}

/// Pick the winning candidate for one submission.
///
/// A candidate is eligible when it qualifies at the threshold and sits
/// within `day_max` and `business_day_max`; an unknown distance never
/// satisfies a cap. Eligible candidates are ranked by calendar-day
/// distance (unknown last), then by higher `max_ratio`, then by
/// reference row. When nothing is eligible the best scoring candidate is
/// retained for manual review.
pub fn select_best(candidates: &[Candidate], options: &SelectOptions) -> Selection {
    let closest = candidates
        .iter()
        .filter(|candidate| candidate.scores.qualifies(options.threshold))
        .filter(|candidate| within_caps(candidate, options))
        .min_by(|a, b| {
            nulls_last(a.day_diff, b.day_diff)
                .then_with(|| by_ratio_desc(a, b))
                .then_with(|| a.reference.cmp(&b.reference))
        });

    match closest {
        Some(candidate) => Selection::Matched(*candidate),
        None => Selection::Unmatched(best_scoring(candidates)),
    }
}

fn within_caps(candidate: &Candidate, options: &SelectOptions) -> bool {
    let fits = |distance: Option<i64>, cap: Option<u32>| match cap {
        Some(cap) => distance.is_some_and(|distance| distance <= i64::from(cap)),
        None => true,
    };
    fits(candidate.distance(DateDistance::Days), options.day_max)
        && fits(
            candidate.distance(DateDistance::BusinessDays),
            options.business_day_max,
        )
}

fn by_ratio_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.scores.max_ratio().total_cmp(&a.scores.max_ratio())
}

fn best_scoring(candidates: &[Candidate]) -> Option<Candidate> {
    candidates
        .iter()
        .min_by(|a, b| by_ratio_desc(a, b).then_with(|| a.reference.cmp(&b.reference)))
        .copied()
}

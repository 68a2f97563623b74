//! String similarity ratio.
//!
//! The Indel ratio `100 * 2M / T`, where `M` is the length of the longest
//! common subsequence and `T` the combined length of both strings. The
//! score is symmetric in its arguments.

use rapidfuzz::fuzz;

/// Similarity of two optional strings on a 0-100 scale.
///
/// The result is rounded to the nearest whole number, halves to even. A
/// missing or empty operand scores 0.
///
/// # Examples
///
/// ```
/// use raccoon_match::fuzz::ratio;
///
/// assert_eq!(ratio(Some("SMITH"), Some("SMITH")), 100.0);
/// assert_eq!(ratio(Some("MITCHELL"), Some("MITHCELL")), 88.0);
/// assert_eq!(ratio(None, Some("SMITH")), 0.0);
/// ```
pub fn ratio(a: Option<&str>, b: Option<&str>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.0;
    };
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    (100.0 * fuzz::ratio(a.chars(), b.chars())).round_ties_even()
}

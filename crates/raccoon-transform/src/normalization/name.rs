//! Name cleaning.

/// Clean a name for comparison: keep ASCII letters only, uppercased.
///
/// Digits, punctuation and whitespace are all dropped, so compound and
/// hyphenated names collapse into a single token. A value with no letters
/// at all cleans to `None` and counts as missing.
///
/// # Examples
///
/// ```
/// use raccoon_transform::clean_name;
///
/// assert_eq!(clean_name(Some("A$AP rocky")).as_deref(), Some("AAPROCKY"));
/// assert_eq!(clean_name(Some("Mary-Jane O'Neil")).as_deref(), Some("MARYJANEONEIL"));
/// assert_eq!(clean_name(Some("123")), None);
/// assert_eq!(clean_name(None), None);
/// ```
pub fn clean_name(value: Option<&str>) -> Option<String> {
    let cleaned: String = value?
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|ch| ch.to_ascii_uppercase())
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

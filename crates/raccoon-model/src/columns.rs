//! Names of the columns the matcher derives and attaches to tables.

/// Cleaned first name (uppercase ASCII letters only).
pub const FIRST_NAME_CLEAN: &str = "first_name_clean";
/// Cleaned last name (uppercase ASCII letters only).
pub const LAST_NAME_CLEAN: &str = "last_name_clean";
/// Parsed date of birth.
pub const DOB_CLEAN: &str = "dob_clean";
/// Parsed specimen collection date.
pub const COLLECTION_DATE_CLEAN: &str = "collection_date_clean";

pub const FIRST_NAME_RESULT: &str = "first_name_result";
pub const LAST_NAME_RESULT: &str = "last_name_result";
pub const REVERSE_FIRST_NAME_RESULT: &str = "reverse_first_name_result";
pub const REVERSE_LAST_NAME_RESULT: &str = "reverse_last_name_result";
pub const MATCH_RATIO: &str = "match_ratio";
pub const REVERSE_MATCH_RATIO: &str = "reverse_match_ratio";
/// Larger of `match_ratio` and `reverse_match_ratio`.
pub const MAX_RATIO: &str = "max_ratio";
/// Absolute calendar days between the two collection dates.
pub const DAY_DIFF: &str = "day_diff";
/// Absolute business days between the two collection dates.
pub const BUSINESS_DAY_DIFF: &str = "business_day_diff";

/// How an exact match was found (`identifier` or `demographics`).
pub const EXACT_MATCH_BASIS: &str = "exact_match_basis";

/// Row index synthesized when no key column is configured.
pub const SYNTHETIC_KEY: &str = "__key__";

/// Suffix appended to reference columns whose name collides with a
/// submission column in joined output.
pub const REFERENCE_SUFFIX: &str = "_ref";

pub const SUBMISSION_NUMBER: &str = "submission_number";
pub const INTERNAL_CREATE_DATE: &str = "internal_create_date";

/// Derived columns attached by normalization, in output order.
pub const CLEAN_COLUMNS: [&str; 4] = [
    FIRST_NAME_CLEAN,
    LAST_NAME_CLEAN,
    DOB_CLEAN,
    COLLECTION_DATE_CLEAN,
];

/// Score columns attached to fuzzy output, in output order.
pub const SCORE_COLUMNS: [&str; 9] = [
    FIRST_NAME_RESULT,
    LAST_NAME_RESULT,
    REVERSE_FIRST_NAME_RESULT,
    REVERSE_LAST_NAME_RESULT,
    MATCH_RATIO,
    REVERSE_MATCH_RATIO,
    MAX_RATIO,
    DAY_DIFF,
    BUSINESS_DAY_DIFF,
];

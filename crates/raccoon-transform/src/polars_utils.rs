//! Polars `AnyValue` conversions.

use polars::prelude::AnyValue;

/// Converts a cell value to its string form.
/// Returns an empty string for null; floats are printed without trailing zeros.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Converts a cell value to a string, returning `None` for null or blank.
pub fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    if s.trim().is_empty() { None } else { Some(s) }
}

fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_and_floats() {
        assert_eq!(any_to_string(AnyValue::Int64(42)), "42");
        assert_eq!(any_to_string(AnyValue::Float64(1.50)), "1.5");
        assert_eq!(any_to_string(AnyValue::Float64(10.0)), "10");
        assert_eq!(any_to_string(AnyValue::Float64(100.0)), "100");
    }

    #[test]
    fn blank_strings_are_none() {
        assert_eq!(any_to_string_non_empty(AnyValue::String("  ")), None);
        assert_eq!(any_to_string_non_empty(AnyValue::Null), None);
        assert_eq!(
            any_to_string_non_empty(AnyValue::String("WA123")).as_deref(),
            Some("WA123")
        );
    }
}

//! Exact matching of submission keys against reference identifiers.
//!
//! Lab submissions usually carry an accession or order number that the
//! registry may already hold. When identifier columns are configured, a
//! submission whose key equals one of them is linked directly, before
//! any demographic matching.

use std::collections::HashMap;

use polars::prelude::{DataFrame, PolarsResult};
use raccoon_transform::cell_string;

/// Index of identifier values to reference rows, one map per column.
#[derive(Debug, Default)]
pub struct IdentifierIndex {
    columns: Vec<HashMap<String, usize>>,
}

impl IdentifierIndex {
    /// Index `columns` of `reference`; the first row holding a value wins.
    pub fn build(reference: &DataFrame, columns: &[String]) -> PolarsResult<Self> {
        let mut indexed = Vec::with_capacity(columns.len());
        for name in columns {
            let column = reference.column(name)?;
            let mut values = HashMap::new();
            for row in 0..reference.height() {
                if let Some(value) = cell_string(column, row)? {
                    values.entry(value.trim().to_string()).or_insert(row);
                }
            }
            indexed.push(values);
        }
        Ok(Self { columns: indexed })
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Reference row for a key, trying identifier columns in order.
    pub fn lookup(&self, key: &str) -> Option<usize> {
        let key = key.trim();
        self.columns
            .iter()
            .find_map(|values| values.get(key).copied())
    }
}

/// Link each submission key to a reference row where possible.
///
/// Returns `(submission_row, reference_row)` pairs in submission order.
pub fn match_identifiers(keys: &[Option<String>], index: &IdentifierIndex) -> Vec<(usize, usize)> {
    if index.is_empty() {
        return Vec::new();
    }
    keys.iter()
        .enumerate()
        .filter_map(|(row, key)| {
            let reference = index.lookup(key.as_deref()?)?;
            Some((row, reference))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use polars::prelude::{Column, NamedFrom};

    use super::*;

    fn reference() -> DataFrame {
        DataFrame::new(vec![
            Column::new("CASE_ID".into(), vec![100_i64, 101, 102]),
            Column::new(
                "ACCESSION".into(),
                vec![Some("WA001"), None, Some("WA001")],
            ),
            Column::new("ORDER_NUM".into(), vec![Some("X9"), Some("WA002"), None]),
        ])
        .unwrap()
    }

    fn columns() -> Vec<String> {
        vec!["ACCESSION".to_string(), "ORDER_NUM".to_string()]
    }

    #[test]
    fn first_column_then_second() {
        let index = IdentifierIndex::build(&reference(), &columns()).unwrap();
        assert_eq!(index.lookup("WA001"), Some(0));
        assert_eq!(index.lookup("WA002"), Some(1));
        assert_eq!(index.lookup(" X9 "), Some(0));
        assert_eq!(index.lookup("WA404"), None);
    }

    #[test]
    fn matches_keys_in_submission_order() {
        let index = IdentifierIndex::build(&reference(), &columns()).unwrap();
        let keys = vec![
            Some("WA404".to_string()),
            Some("WA002".to_string()),
            None,
            Some("WA001".to_string()),
        ];
        assert_eq!(match_identifiers(&keys, &index), vec![(1, 1), (3, 0)]);
    }

    #[test]
    fn no_identifier_columns_matches_nothing() {
        let index = IdentifierIndex::build(&reference(), &[]).unwrap();
        let keys = vec![Some("WA001".to_string())];
        assert!(match_identifiers(&keys, &index).is_empty());
    }

    #[test]
    fn unknown_identifier_column_is_an_error() {
        assert!(IdentifierIndex::build(&reference(), &["NOPE".to_string()]).is_err());
    }
}

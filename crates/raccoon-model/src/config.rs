//! Match configuration.
//!
//! All knobs of a match run live in one [`MatchConfig`] that is validated
//! once, before any table is touched. Column names are bound per
//! demographic field, either as one name shared by both tables or as a
//! (source, reference) pair.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};
use crate::outcome::DateDistance;

/// Default similarity threshold (0-100) a candidate must reach.
pub const DEFAULT_THRESHOLD: f64 = 80.0;

/// The demographic fields the matcher reads from both tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemographicField {
    FirstName,
    LastName,
    Dob,
    CollectionDate,
}

impl DemographicField {
    pub const ALL: [DemographicField; 4] = [
        DemographicField::FirstName,
        DemographicField::LastName,
        DemographicField::Dob,
        DemographicField::CollectionDate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DemographicField::FirstName => "first_name",
            DemographicField::LastName => "last_name",
            DemographicField::Dob => "dob",
            DemographicField::CollectionDate => "collection_date",
        }
    }
}

impl fmt::Display for DemographicField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column name binding for one demographic field.
///
/// A per-side name takes precedence over the shared name for that side.
/// The binding is unspecified when neither the shared name nor both
/// per-side names are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl ColumnBinding {
    /// Same column name on both tables.
    pub fn shared(name: impl Into<String>) -> Self {
        Self {
            shared: Some(name.into()),
            ..Self::default()
        }
    }

    /// Different column names on the submission and reference tables.
    pub fn pair(source: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            shared: None,
            source: Some(source.into()),
            reference: Some(reference.into()),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.shared.is_none() && self.source.is_none() && self.reference.is_none()
    }

    /// Resolve to concrete column names for both sides.
    pub fn resolve(&self, field: DemographicField) -> Result<ResolvedBinding> {
        let source = self.source.as_ref().or(self.shared.as_ref());
        let reference = self.reference.as_ref().or(self.shared.as_ref());
        match (source, reference) {
            (Some(source), Some(reference)) => Ok(ResolvedBinding {
                source: source.clone(),
                reference: reference.clone(),
            }),
            _ => Err(MatchError::MissingBinding { field }),
        }
    }
}

impl From<&str> for ColumnBinding {
    fn from(name: &str) -> Self {
        Self::shared(name)
    }
}

impl From<(&str, &str)> for ColumnBinding {
    fn from((source, reference): (&str, &str)) -> Self {
        Self::pair(source, reference)
    }
}

/// Column names for one field on both tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBinding {
    pub source: String,
    pub reference: String,
}

/// All four demographic bindings, resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub first_name: ResolvedBinding,
    pub last_name: ResolvedBinding,
    pub dob: ResolvedBinding,
    pub collection_date: ResolvedBinding,
}

impl ResolvedColumns {
    pub fn get(&self, field: DemographicField) -> &ResolvedBinding {
        match field {
            DemographicField::FirstName => &self.first_name,
            DemographicField::LastName => &self.last_name,
            DemographicField::Dob => &self.dob,
            DemographicField::CollectionDate => &self.collection_date,
        }
    }

    /// Submission-side column names in field order.
    pub fn source_names(&self) -> [&str; 4] {
        DemographicField::ALL.map(|field| self.get(field).source.as_str())
    }

    /// Reference-side column names in field order.
    pub fn reference_names(&self) -> [&str; 4] {
        DemographicField::ALL.map(|field| self.get(field).reference.as_str())
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Options for one submission-to-reference match run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    #[serde(default)]
    pub first_name: ColumnBinding,
    #[serde(default)]
    pub last_name: ColumnBinding,
    #[serde(default)]
    pub dob: ColumnBinding,
    #[serde(default)]
    pub collection_date: ColumnBinding,

    /// Unique submission key column. A row index is synthesized when unset.
    #[serde(default)]
    pub key: Option<String>,

    /// Minimum name similarity (0-100, inclusive) for a fuzzy candidate.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Maximum calendar days between collection dates of a fuzzy match.
    #[serde(default)]
    pub day_max: Option<u32>,

    /// Maximum business days between collection dates of a fuzzy match.
    #[serde(default)]
    pub business_day_max: Option<u32>,

    /// Reference identifier columns (accession, order number) compared
    /// against the submission key before demographic matching.
    #[serde(default)]
    pub identifier_columns: Vec<String>,

    /// Extra reference columns to carry into output (case id, etc.).
    /// `None` keeps every reference column.
    #[serde(default)]
    pub reference_columns: Option<Vec<String>>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            first_name: ColumnBinding::default(),
            last_name: ColumnBinding::default(),
            dob: ColumnBinding::default(),
            collection_date: ColumnBinding::default(),
            key: None,
            threshold: DEFAULT_THRESHOLD,
            day_max: None,
            business_day_max: None,
            identifier_columns: Vec::new(),
            reference_columns: None,
        }
    }
}

impl MatchConfig {
    pub fn new(
        first_name: impl Into<ColumnBinding>,
        last_name: impl Into<ColumnBinding>,
        dob: impl Into<ColumnBinding>,
        collection_date: impl Into<ColumnBinding>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            dob: dob.into(),
            collection_date: collection_date.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_day_max(mut self, day_max: Option<u32>) -> Self {
        self.day_max = day_max;
        self
    }

    #[must_use]
    pub fn with_business_day_max(mut self, business_day_max: Option<u32>) -> Self {
        self.business_day_max = business_day_max;
        self
    }

    #[must_use]
    pub fn with_identifier_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_reference_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reference_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn binding(&self, field: DemographicField) -> &ColumnBinding {
        match field {
            DemographicField::FirstName => &self.first_name,
            DemographicField::LastName => &self.last_name,
            DemographicField::Dob => &self.dob,
            DemographicField::CollectionDate => &self.collection_date,
        }
    }

    /// Configured distance caps, calendar days first.
    pub fn date_caps(&self) -> Vec<(DateDistance, u32)> {
        let mut caps = Vec::new();
        if let Some(max) = self.day_max {
            caps.push((DateDistance::Days, max));
        }
        if let Some(max) = self.business_day_max {
            caps.push((DateDistance::BusinessDays, max));
        }
        caps
    }

    /// Check the threshold range and resolve every column binding.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MissingBinding`] for the first unspecified
    /// binding, or [`MatchError::InvalidThreshold`] when the threshold is
    /// not a number in `0..=100`.
    pub fn validate(&self) -> Result<ResolvedColumns> {
        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(MatchError::InvalidThreshold(self.threshold));
        }
        Ok(ResolvedColumns {
            first_name: self.first_name.resolve(DemographicField::FirstName)?,
            last_name: self.last_name.resolve(DemographicField::LastName)?,
            dob: self.dob.resolve(DemographicField::Dob)?,
            collection_date: self
                .collection_date
                .resolve(DemographicField::CollectionDate)?,
        })
    }
}

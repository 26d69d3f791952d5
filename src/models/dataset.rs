//! Dataset record types.
//!
//! A dataset record is the facet mapping of one namelist section, enriched
//! with the time window and a project tag.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{EvalprepError, Result};

/// Facets whose values are integers rather than strings.
pub const INTEGER_FACETS: [&str; 3] = ["start_year", "end_year", "tier"];

/// Value of a single facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetValue {
    Integer(i64),
    Text(String),
}

impl FacetValue {
    /// The value as a string slice, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Integer(_) => None,
        }
    }
}

impl fmt::Display for FacetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FacetValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FacetValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FacetValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

/// One dataset description.
///
/// Keys are unique and keep their first-insertion position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetRecord {
    facets: IndexMap<String, FacetValue>,
}

impl DatasetRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from parsed string facets.
    ///
    /// Facets listed in [`INTEGER_FACETS`] must hold integers.
    pub fn from_string_facets(facets: IndexMap<String, String>) -> Result<Self> {
        let mut record = Self::new();
        for (key, value) in facets {
            let typed = if INTEGER_FACETS.contains(&key.as_str()) {
                let n = value.parse::<i64>().map_err(|_| {
                    EvalprepError::MalformedInput(format!(
                        "facet '{key}' must be an integer, got '{value}'"
                    ))
                })?;
                FacetValue::Integer(n)
            } else {
                FacetValue::Text(value)
            };
            record.insert(key, typed);
        }
        Ok(record)
    }

    /// Insert or replace a facet. Returns the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FacetValue>,
    ) -> Option<FacetValue> {
        self.facets.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&FacetValue> {
        self.facets.get(key)
    }

    /// Facets ordered by key, the layout used for written dataset files.
    pub fn sorted(&self) -> BTreeMap<&str, &FacetValue> {
        self.facets.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }
}

impl<K: Into<String>, V: Into<FacetValue>> FromIterator<(K, V)> for DatasetRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

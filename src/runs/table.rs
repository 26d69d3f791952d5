//! Runs-config table.
//!
//! A single top-level object mapping run labels to run entries. Labels are
//! stored lower-cased; entry order follows the source document.

use indexmap::IndexMap;
use indexmap::map::Entry;
use std::path::Path;
use tracing::debug;

use crate::models::{EvalprepError, RawRunEntry, Result};

/// Run label → raw run entry, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunsConfigTable {
    entries: IndexMap<String, RawRunEntry>,
}

impl RunsConfigTable {
    /// Build a table, lower-casing every label.
    ///
    /// Two labels that only differ in case are rejected.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, RawRunEntry)>,
    {
        let mut table = IndexMap::new();
        for (label, entry) in entries {
            match table.entry(label.to_lowercase()) {
                Entry::Occupied(e) => {
                    return Err(EvalprepError::Validation(format!(
                        "run label '{label}' duplicates '{}' after case normalization",
                        e.key()
                    )));
                }
                Entry::Vacant(e) => {
                    e.insert(entry);
                }
            }
        }
        Ok(Self { entries: table })
    }

    /// Parse a table from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: IndexMap<String, RawRunEntry> = serde_json::from_str(content)
            .map_err(|e| EvalprepError::Parse(format!("Invalid runs-config table: {e}")))?;
        Self::from_entries(raw)
    }

    /// Parse a table from YAML text, e.g. a dataset file keyed by a facet.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let raw: IndexMap<String, RawRunEntry> = serde_yaml::from_str(content)
            .map_err(|e| EvalprepError::Parse(format!("Invalid runs-config table: {e}")))?;
        Self::from_entries(raw)
    }

    /// Load a table from disk. YAML for `.yml`/`.yaml`, JSON otherwise.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EvalprepError::io(format!("reading runs-config table {}", path.display()), e)
        })?;

        let is_yaml = path
            .extension()
            .is_some_and(|ext| ext == "yml" || ext == "yaml");
        let table = if is_yaml {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };

        debug!(path = %path.display(), runs = table.len(), "Loaded runs-config table");
        Ok(table)
    }

    /// Entry whose label matches, ignoring case.
    pub fn get(&self, label: &str) -> Option<&RawRunEntry> {
        self.entries.get(&label.to_lowercase())
    }

    /// Stored label and entry for a label, ignoring case.
    pub fn get_key_value(&self, label: &str) -> Option<(&str, &RawRunEntry)> {
        self.entries
            .get_key_value(&label.to_lowercase())
            .map(|(k, v)| (k.as_str(), v))
    }

    /// All `(label, entry)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawRunEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Labels sorted alphabetically.
    pub fn sorted_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.entries.keys().cloned().collect();
        labels.sort();
        labels
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

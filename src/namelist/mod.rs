//! Namelist module - namelist text to dataset records.
//!
//! Flow: raw text → records → facet mappings → enriched dataset records →
//! per-namelist YAML files.

mod facets;
mod parser;

pub use facets::*;
pub use parser::*;

use indexmap::IndexMap;
use std::collections::BTreeMap;

use crate::models::{DatasetRecord, EvalprepError, FacetValue, Result};

/// File name of the dataset list written for a namelist basename.
pub fn dataset_file_name(basename: &str) -> String {
    format!("{basename}.yml")
}

/// Render dataset records as a YAML list with sorted keys.
pub fn render_dataset_list(records: &[DatasetRecord]) -> Result<String> {
    let sorted: Vec<BTreeMap<&str, &FacetValue>> =
        records.iter().map(DatasetRecord::sorted).collect();
    serde_yaml::to_string(&sorted)
        .map_err(|e| EvalprepError::Parse(format!("Serializing datasets: {e}")))
}

/// Render keyed dataset records as a YAML mapping with sorted keys.
pub fn render_dataset_index(index: &IndexMap<String, DatasetRecord>) -> Result<String> {
    let sorted: BTreeMap<&str, BTreeMap<&str, &FacetValue>> = index
        .iter()
        .map(|(k, record)| (k.as_str(), record.sorted()))
        .collect();
    serde_yaml::to_string(&sorted)
        .map_err(|e| EvalprepError::Parse(format!("Serializing dataset index: {e}")))
}

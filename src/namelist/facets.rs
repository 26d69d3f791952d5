//! Facet parsing and dataset enrichment.

use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::{debug, warn};

use super::parser::{header_name, split_records};
use crate::models::{DatasetRecord, EvalprepError, FacetValue, Result};
use crate::window::InclusiveWindow;

/// Parse one record string into an ordered facet mapping.
///
/// Tokens are separated by `,`; each splits on its first `=` and both sides
/// are trimmed. Any further `=` stays in the value. Blank tokens are skipped.
/// A repeated key keeps its first position and takes the later value.
pub fn parse_facets(record: &str) -> Result<IndexMap<String, String>> {
    let mut facets = IndexMap::new();

    for token in record.split(',') {
        if token.trim().is_empty() {
            continue;
        }
        let (key, value) = token.split_once('=').ok_or_else(|| {
            EvalprepError::MalformedInput(format!("facet '{}' has no '='", token.trim()))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(EvalprepError::MalformedInput(format!(
                "facet '{}' has an empty name",
                token.trim()
            )));
        }
        if let Some(previous) = facets.insert(key.to_string(), value.trim().to_string()) {
            warn!(facet = key, previous = %previous, "Duplicate facet, keeping last value");
        }
    }

    Ok(facets)
}

/// Render facets back into record form (`key=value,` per facet).
pub fn render_facets(facets: &IndexMap<String, String>) -> String {
    facets
        .iter()
        .map(|(k, v)| format!("{k}={v},"))
        .collect()
}

/// Add the window bounds and project tag to parsed facets.
///
/// The added facets override any same-named facet from the record.
pub fn enrich_facets(
    facets: IndexMap<String, String>,
    window: &InclusiveWindow,
    project: &str,
) -> Result<DatasetRecord> {
    let mut record = DatasetRecord::from_string_facets(facets)?;
    record.insert("start_year", i64::from(window.start_year));
    record.insert("end_year", i64::from(window.end_year));
    record.insert("project", project);
    Ok(record)
}

/// Parse namelist text into enriched dataset records, one per section.
pub fn process_namelist(
    text: &str,
    window: &InclusiveWindow,
    project: &str,
) -> Result<Vec<DatasetRecord>> {
    let records = split_records(text)?
        .iter()
        .map(|record| parse_facets(record).and_then(|f| enrich_facets(f, window, project)))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        namelist = header_name(text).unwrap_or("<unnamed>"),
        datasets = records.len(),
        "Processed namelist"
    );
    Ok(records)
}

/// Key dataset records by the text value of one of their facets.
///
/// Every record must carry the facet and its values must be unique.
pub fn index_by_facet(
    records: Vec<DatasetRecord>,
    facet: &str,
) -> Result<IndexMap<String, DatasetRecord>> {
    let mut indexed = IndexMap::with_capacity(records.len());

    for (position, record) in records.into_iter().enumerate() {
        let key = match record.get(facet) {
            Some(FacetValue::Text(s)) => s.clone(),
            Some(FacetValue::Integer(n)) => n.to_string(),
            None => {
                return Err(EvalprepError::Validation(format!(
                    "dataset {position} has no '{facet}' facet"
                )));
            }
        };
        match indexed.entry(key) {
            Entry::Occupied(e) => {
                return Err(EvalprepError::Validation(format!(
                    "duplicate '{facet}' value '{}'",
                    e.key()
                )));
            }
            Entry::Vacant(e) => {
                e.insert(record);
            }
        }
    }

    Ok(indexed)
}

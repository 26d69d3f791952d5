//! Run metadata resolution.
//!
//! Precedence for a run label:
//! 1. A non-empty runs-config table: label match (case-insensitive), then the
//!    first entry in table order whose `suite_id` equals the label, else a
//!    lookup error listing every label.
//! 2. No table: the direct inputs, all four required fields present.
//!
//! The alias is the explicit plot label when given, then the entry's own
//! `label_for_plots`, then the suite id.

use tracing::debug;

use super::RunsConfigTable;
use crate::models::{DirectRunInputs, EvalprepError, RawRunEntry, Result, RunMetadata};

/// Resolves run identities. Performs no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunMetadataResolver<'a> {
    table: Option<&'a RunsConfigTable>,
}

impl<'a> RunMetadataResolver<'a> {
    /// An empty table behaves as if none were given.
    pub fn new(table: Option<&'a RunsConfigTable>) -> Self {
        Self {
            table: table.filter(|t| !t.is_empty()),
        }
    }

    /// Resolve the run named `label`.
    ///
    /// `direct` supplies the identity when there is no table, and its
    /// `label_for_plots` is the explicit plot label in either case.
    pub fn resolve(&self, label: &str, direct: &DirectRunInputs) -> Result<RunMetadata> {
        let direct = direct.normalized();

        let (inputs, context) = match self.table {
            Some(table) => {
                let (key, entry) = lookup(table, label)?;
                (entry.normalize(), format!("runs-config entry '{key}'"))
            }
            None => (direct.clone(), format!("run '{label}'")),
        };

        let explicit_alias = direct.label_for_plots;
        let metadata = into_metadata(inputs, explicit_alias, &context)?;

        debug!(
            label,
            model_id = %metadata.model_id,
            suite_id = %metadata.suite_id,
            "Resolved run metadata"
        );
        Ok(metadata)
    }
}

fn lookup<'t>(table: &'t RunsConfigTable, label: &str) -> Result<(&'t str, &'t RawRunEntry)> {
    if let Some(found) = table.get_key_value(label) {
        return Ok(found);
    }

    table
        .iter()
        .find(|(_, entry)| entry.resolved_suite_id().as_deref() == Some(label))
        .ok_or_else(|| EvalprepError::Lookup {
            label: label.to_string(),
            available: table.sorted_labels(),
        })
}

fn into_metadata(
    inputs: DirectRunInputs,
    explicit_alias: Option<String>,
    context: &str,
) -> Result<RunMetadata> {
    let DirectRunInputs {
        model_id,
        suite_id,
        calendar,
        variant_label,
        label_for_plots,
    } = inputs;

    match (model_id, suite_id, calendar, variant_label) {
        (Some(model_id), Some(suite_id), Some(calendar), Some(variant_label)) => {
            let alias = explicit_alias
                .or(label_for_plots)
                .unwrap_or_else(|| suite_id.clone());
            Ok(RunMetadata {
                model_id,
                suite_id,
                calendar,
                variant_label,
                alias,
            })
        }
        (model_id, suite_id, calendar, variant_label) => {
            let missing = [
                ("model_id", model_id.is_none()),
                ("suite_id", suite_id.is_none()),
                ("calendar", calendar.is_none()),
                ("variant_label", variant_label.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name));
            Err(EvalprepError::missing(context, missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RunsConfigTable {
        RunsConfigTable::from_json_str(
            r#"{
                "ref": {
                    "model_id": "HadGEM3-GC31-LL",
                    "suite_id": "u-bv526",
                    "calendar": "360_day",
                    "variant_label": "r5i1p1f3"
                },
                "eval": {
                    "MODEL_ID": "HadGEM3-GC5E-LL",
                    "SUITE_ID": "u-cw673",
                    "CALENDAR": "gregorian",
                    "VARIANT_LABEL": "r1i1p1f1",
                    "label_for_plots": "HadGEM3-GC5E-LL N96ORCA1"
                }
            }"#,
        )
        .unwrap()
    }

    fn direct(model: &str, suite: &str, calendar: &str, variant: &str) -> DirectRunInputs {
        DirectRunInputs {
            model_id: Some(model.to_string()),
            suite_id: Some(suite.to_string()),
            calendar: Some(calendar.to_string()),
            variant_label: Some(variant.to_string()),
            label_for_plots: None,
        }
    }

    #[test]
    fn test_label_and_suite_id_resolve_identically() {
        let table = table();
        let resolver = RunMetadataResolver::new(Some(&table));
        let by_label = resolver.resolve("eval", &DirectRunInputs::default()).unwrap();
        let by_suite = resolver.resolve("u-cw673", &DirectRunInputs::default()).unwrap();
        assert_eq!(by_label, by_suite);
        assert_eq!(by_label.model_id, "HadGEM3-GC5E-LL");
        assert_eq!(by_label.alias, "HadGEM3-GC5E-LL N96ORCA1");
    }

    #[test]
    fn test_label_match_ignores_case() {
        let table = table();
        let resolver = RunMetadataResolver::new(Some(&table));
        let meta = resolver.resolve("REF", &DirectRunInputs::default()).unwrap();
        assert_eq!(meta.suite_id, "u-bv526");
        assert_eq!(meta.alias, "u-bv526");
    }

    #[test]
    fn test_table_wins_over_direct_inputs() {
        let table = table();
        let resolver = RunMetadataResolver::new(Some(&table));
        let meta = resolver
            .resolve("ref", &direct("Other", "u-xx000", "gregorian", "r9"))
            .unwrap();
        assert_eq!(meta.model_id, "HadGEM3-GC31-LL");
    }

    #[test]
    fn test_unknown_label_lists_sorted_keys() {
        let table = table();
        let resolver = RunMetadataResolver::new(Some(&table));
        match resolver.resolve("control", &DirectRunInputs::default()) {
            Err(EvalprepError::Lookup { label, available }) => {
                assert_eq!(label, "control");
                assert_eq!(available, vec!["eval", "ref"]);
            }
            other => panic!("expected lookup error, got {other:?}"),
        }
    }

    #[test]
    fn test_first_suite_id_match_wins() {
        let table = RunsConfigTable::from_json_str(
            r#"{
                "first": {"model_id": "A", "suite_id": "u-1", "calendar": "c", "variant_label": "v"},
                "second": {"model_id": "B", "suite_id": "u-1", "calendar": "c", "variant_label": "v"}
            }"#,
        )
        .unwrap();
        let meta = RunMetadataResolver::new(Some(&table))
            .resolve("u-1", &DirectRunInputs::default())
            .unwrap();
        assert_eq!(meta.model_id, "A");
    }

    #[test]
    fn test_incomplete_entry_names_missing_fields() {
        let table = RunsConfigTable::from_json_str(r#"{"ref": {"model_id": "A", "calendar": ""}}"#)
            .unwrap();
        match RunMetadataResolver::new(Some(&table)).resolve("ref", &DirectRunInputs::default()) {
            Err(EvalprepError::MissingConfiguration { context, fields }) => {
                assert_eq!(context, "runs-config entry 'ref'");
                assert_eq!(fields, vec!["suite_id", "calendar", "variant_label"]);
            }
            other => panic!("expected missing configuration, got {other:?}"),
        }
    }

    #[test]
    fn test_direct_inputs_without_table() {
        let meta = RunMetadataResolver::new(None)
            .resolve("reference", &direct("UKESM1-0-LL", "u-az513", "360_day", "r5i1p1f3"))
            .unwrap();
        assert_eq!(
            meta,
            RunMetadata {
                model_id: "UKESM1-0-LL".to_string(),
                suite_id: "u-az513".to_string(),
                calendar: "360_day".to_string(),
                variant_label: "r5i1p1f3".to_string(),
                alias: "u-az513".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_table_falls_back_to_direct_inputs() {
        let empty = RunsConfigTable::default();
        let meta = RunMetadataResolver::new(Some(&empty))
            .resolve("reference", &direct("M", "u-1", "c", "v"))
            .unwrap();
        assert_eq!(meta.suite_id, "u-1");
    }

    #[test]
    fn test_missing_direct_inputs_are_named() {
        let mut inputs = direct("M", "u-1", "c", "v");
        inputs.model_id = None;
        inputs.variant_label = Some("   ".to_string());
        let err = RunMetadataResolver::new(None)
            .resolve("evaluation", &inputs)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing configuration for run 'evaluation': model_id, variant_label"
        );
    }

    #[test]
    fn test_explicit_plot_label_becomes_alias() {
        let mut inputs = direct("M", "u-1", "c", "v");
        inputs.label_for_plots = Some("GC5 N96".to_string());
        let meta = RunMetadataResolver::new(None).resolve("evaluation", &inputs).unwrap();
        assert_eq!(meta.alias, "GC5 N96");

        let table = table();
        let plot_only = DirectRunInputs {
            label_for_plots: Some("Override".to_string()),
            ..Default::default()
        };
        let meta = RunMetadataResolver::new(Some(&table)).resolve("eval", &plot_only).unwrap();
        assert_eq!(meta.alias, "Override");
    }
}

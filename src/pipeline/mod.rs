//! Pipeline module - one task per workflow step.
//!
//! Each task reads its inputs, builds every output in memory and only then
//! writes, so a failing task leaves no partial artifacts.

mod datasets;
mod recipe;
mod request;

pub use datasets::*;
pub use recipe::*;
pub use request::*;

use tracing::info;

use crate::models::{Config, DirectRunInputs, Result, RunMetadata, RunRole};
use crate::runs::{RunMetadataResolver, RunsConfigTable};

/// Load the runs-config table named in the configuration, if any.
pub fn load_runs_table(config: &Config) -> Result<Option<RunsConfigTable>> {
    match &config.runs.table {
        Some(path) => {
            let table = RunsConfigTable::from_file(path)?;
            info!(path = %path.display(), runs = table.len(), "Using runs-config table");
            Ok(Some(table))
        }
        None => Ok(None),
    }
}

/// Direct inputs configured for a run label.
///
/// Only the `reference` and `evaluation` labels have a config section.
pub fn direct_inputs_for<'c>(config: &'c Config, label: &str) -> &'c DirectRunInputs {
    static NONE: DirectRunInputs = DirectRunInputs {
        model_id: None,
        suite_id: None,
        calendar: None,
        variant_label: None,
        label_for_plots: None,
    };
    match label.to_lowercase().as_str() {
        "reference" => &config.runs.reference,
        "evaluation" => &config.runs.evaluation,
        _ => &NONE,
    }
}

/// Resolve one run label against the configured sources.
pub fn resolve_label(
    config: &Config,
    table: Option<&RunsConfigTable>,
    label: &str,
) -> Result<RunMetadata> {
    RunMetadataResolver::new(table).resolve(label, direct_inputs_for(config, label))
}

/// Reference and evaluation metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRuns {
    pub reference: RunMetadata,
    pub evaluation: RunMetadata,
}

impl ResolvedRuns {
    /// Resolve both roles, loading the table fresh.
    pub fn resolve(config: &Config) -> Result<Self> {
        let table = load_runs_table(config)?;
        Ok(Self {
            reference: resolve_label(config, table.as_ref(), RunRole::Reference.label())?,
            evaluation: resolve_label(config, table.as_ref(), RunRole::Evaluation.label())?,
        })
    }
}

//! Overlaying run metadata onto a recipe.
//!
//! Overlay fields always win; every other field of an entry keeps its value.
//! Entries beyond the reference and evaluation slots are never touched.

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use super::RecipeDocument;
use crate::models::{DatasetRecord, EvalprepError, OverlayConfig, Result, RunMetadata, RunRole};
use crate::window::InclusiveWindow;

/// Version of the overlay field set written by [`DatasetOverlay`].
pub const OVERLAY_SCHEMA_VERSION: u32 = 1;

/// Fields written onto a recipe dataset entry.
///
/// Schema v1: `dataset, project, exp, activity, ensemble, [institute],
/// start_year, end_year, alias`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetOverlay {
    pub dataset: String,
    pub project: String,
    pub exp: String,
    pub activity: String,
    pub ensemble: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institute: Option<String>,
    pub start_year: i32,
    pub end_year: i32,
    pub alias: String,
}

impl DatasetOverlay {
    pub fn new(run: &RunMetadata, fixed: &OverlayConfig, window: &InclusiveWindow) -> Self {
        Self {
            dataset: run.model_id.clone(),
            project: fixed.project.clone(),
            exp: fixed.exp.clone(),
            activity: fixed.activity.clone(),
            ensemble: run.variant_label.clone(),
            institute: fixed.institute.clone(),
            start_year: window.start_year,
            end_year: window.end_year,
            alias: run.alias.clone(),
        }
    }

    fn to_mapping(&self) -> Result<Mapping> {
        match serde_yaml::to_value(self) {
            Ok(Value::Mapping(m)) => Ok(m),
            Ok(_) => Err(EvalprepError::Parse(
                "dataset overlay did not serialize to a mapping".to_string(),
            )),
            Err(e) => Err(EvalprepError::Parse(format!("Serializing overlay: {e}"))),
        }
    }
}

/// Writes resolved runs and the window into a recipe.
#[derive(Debug, Clone)]
pub struct RecipeDatasetMerger<'a> {
    fixed: &'a OverlayConfig,
    window: InclusiveWindow,
}

impl<'a> RecipeDatasetMerger<'a> {
    pub fn new(fixed: &'a OverlayConfig, window: InclusiveWindow) -> Self {
        Self { fixed, window }
    }

    /// Overlay the reference and evaluation runs onto their entries.
    ///
    /// The document is left unmodified when it fails validation.
    pub fn merge_runs(
        &self,
        document: &mut RecipeDocument,
        reference: &RunMetadata,
        evaluation: &RunMetadata,
    ) -> Result<()> {
        document.validate_roles()?;

        let overlays = [
            (
                RunRole::Reference,
                DatasetOverlay::new(reference, self.fixed, &self.window).to_mapping()?,
            ),
            (
                RunRole::Evaluation,
                DatasetOverlay::new(evaluation, self.fixed, &self.window).to_mapping()?,
            ),
        ];

        for (role, overlay) in overlays {
            let entry = document.role_dataset_mut(role)?;
            for (key, value) in overlay {
                entry.insert(key, value);
            }
            debug!(%role, schema = OVERLAY_SCHEMA_VERSION, "Overlaid recipe dataset");
        }

        info!(
            reference = %reference.suite_id,
            evaluation = %evaluation.suite_id,
            start_year = self.window.start_year,
            end_year = self.window.end_year,
            "Merged runs into recipe"
        );
        Ok(())
    }
}

/// Append dataset records to the end of the recipe's dataset list.
///
/// Existing entries are not modified. A missing list is created.
pub fn append_extra_datasets(document: &mut RecipeDocument, extra: &[DatasetRecord]) -> Result<()> {
    let values = extra
        .iter()
        .map(|record| {
            serde_yaml::to_value(record)
                .map_err(|e| EvalprepError::Parse(format!("Serializing dataset: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let datasets = document.datasets_mut_or_insert()?;
    let before = datasets.len();
    datasets.extend(values);

    debug!(before, appended = extra.len(), "Appended extra datasets");
    Ok(())
}

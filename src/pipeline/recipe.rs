//! Recipe tasks: run overlay, variables file and user configuration.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::ResolvedRuns;
use crate::models::{Config, EvalprepError, Result};
use crate::namelist::process_namelist;
use crate::output::write_atomic;
use crate::recipe::{
    RecipeDatasetMerger, RecipeDocument, append_extra_datasets, build_user_config,
    recipe_variables, render_variables,
};
use crate::window::WindowSpec;

/// Inputs of the update-recipe task.
#[derive(Debug, Clone)]
pub struct UpdateRecipe {
    /// Recipe rewritten in place
    pub recipe_path: PathBuf,
    /// Namelist whose datasets are appended after the merged entries
    pub extra_datasets: Option<PathBuf>,
}

impl UpdateRecipe {
    /// Merge the resolved runs into the recipe and rewrite it.
    pub fn run(&self, config: &Config, window: WindowSpec) -> Result<RecipeDocument> {
        let inclusive = window.inclusive()?;
        let runs = ResolvedRuns::resolve(config)?;

        let mut recipe = RecipeDocument::from_file(&self.recipe_path)?;
        RecipeDatasetMerger::new(&config.overlay, inclusive).merge_runs(
            &mut recipe,
            &runs.reference,
            &runs.evaluation,
        )?;

        if let Some(namelist) = &self.extra_datasets {
            let text = read(namelist, "namelist")?;
            let extra = process_namelist(&text, &inclusive, &config.datasets.project)?;
            append_extra_datasets(&mut recipe, &extra)?;
        }

        write_atomic(&self.recipe_path, &recipe.to_yaml_string()?)?;
        info!(recipe = %self.recipe_path.display(), "Updated recipe");
        Ok(recipe)
    }
}

/// Write the `<mip>/<variable>` list of a recipe.
pub fn create_variables_file(recipe_path: &Path, output: &Path) -> Result<Vec<String>> {
    let recipe = RecipeDocument::from_file(recipe_path)?;
    let variables = recipe_variables(&recipe)?;
    write_atomic(output, &render_variables(&variables))?;
    info!(count = variables.len(), output = %output.display(), "Wrote variables file");
    Ok(variables)
}

/// Write the ESMValTool user configuration.
///
/// The target is `output` when given, else `[user_config] config_path`.
pub fn configure_process(config: &Config, output: Option<&Path>) -> Result<PathBuf> {
    let target = output
        .map(Path::to_path_buf)
        .or_else(|| config.user_config.config_path.clone())
        .ok_or_else(|| EvalprepError::missing("user configuration", ["config_path"]))?;

    let contents = build_user_config(&config.user_config).to_yaml_string()?;
    write_atomic(&target, &contents)?;
    info!(output = %target.display(), "Wrote user configuration");
    Ok(target)
}

fn read(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| EvalprepError::io(format!("reading {what} {}", path.display()), e))
}

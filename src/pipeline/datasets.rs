//! Namelist files → per-namelist dataset files.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::models::{EvalprepError, Result};
use crate::namelist::{
    dataset_file_name, discover_namelists, index_by_facet, process_namelist, render_dataset_index,
    render_dataset_list,
};
use crate::output::write_all_atomic;
use crate::window::WindowSpec;

/// Inputs of the add-datasets task.
#[derive(Debug, Clone)]
pub struct AddDatasets {
    /// Directory searched for `*.nl` files
    pub namelist_dir: PathBuf,
    /// Directory receiving `<basename>.yml` files, created when absent
    pub target_dir: PathBuf,
    /// Write a mapping keyed by this facet instead of a list
    pub key_facet: Option<String>,
    /// Project tag for every dataset
    pub project: String,
}

impl AddDatasets {
    /// Process every namelist and write one dataset file each.
    ///
    /// Returns the written paths in basename order.
    pub fn run(&self, window: WindowSpec) -> Result<Vec<PathBuf>> {
        let inclusive = window.inclusive()?;
        let namelists = discover_namelists(&self.namelist_dir)?;
        if namelists.is_empty() {
            warn!(dir = %self.namelist_dir.display(), "No namelist files found");
        }

        let mut rendered = Vec::with_capacity(namelists.len());
        for (basename, path) in &namelists {
            let text = fs::read_to_string(path)
                .map_err(|e| EvalprepError::io(format!("reading namelist {}", path.display()), e))?;
            let records = process_namelist(&text, &inclusive, &self.project)
                .map_err(|e| annotate(e, path))?;
            let contents = match &self.key_facet {
                Some(facet) => render_dataset_index(&index_by_facet(records, facet)?)?,
                None => render_dataset_list(&records)?,
            };
            rendered.push((self.target_dir.join(dataset_file_name(basename)), contents));
        }

        fs::create_dir_all(&self.target_dir).map_err(|e| {
            EvalprepError::io(format!("creating {}", self.target_dir.display()), e)
        })?;
        write_all_atomic(rendered.iter().map(|(p, c)| (p.as_path(), c.as_str())))?;

        info!(
            files = rendered.len(),
            target = %self.target_dir.display(),
            "Wrote dataset files"
        );
        Ok(rendered.into_iter().map(|(path, _)| path).collect())
    }
}

fn annotate(err: EvalprepError, path: &Path) -> EvalprepError {
    match err {
        EvalprepError::MalformedInput(msg) => {
            EvalprepError::MalformedInput(format!("{}: {msg}", path.display()))
        }
        other => other,
    }
}

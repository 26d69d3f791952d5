//! Request task.

use std::path::{Path, PathBuf};
use tracing::info;

use super::{load_runs_table, resolve_label};
use crate::models::{Config, Result};
use crate::output::write_atomic;
use crate::request::{RequestAssembler, RequestDocument, RequestFormat, RequestInputs};
use crate::window::WindowSpec;

/// Inputs of the create-request task.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// Run label the request is built for
    pub run_label: String,
    /// Output path; `.cfg`/`.ini` select INI, anything else JSON
    pub output: PathBuf,
}

impl CreateRequest {
    pub fn run(&self, config: &Config, window: WindowSpec) -> Result<RequestDocument> {
        let iso = window.iso()?;
        let inputs = RequestInputs::from_config(&config.request)?;
        let template = load_template(config.request.template.as_deref())?;

        let table = load_runs_table(config)?;
        let run = resolve_label(config, table.as_ref(), &self.run_label)?;

        let request = RequestAssembler::new(&template).assemble(&run, &iso, &inputs)?;
        let contents = request.render(RequestFormat::from_path(&self.output))?;
        write_atomic(&self.output, &contents)?;

        info!(run = %self.run_label, output = %self.output.display(), "Wrote request");
        Ok(request)
    }
}

fn load_template(path: Option<&Path>) -> Result<RequestDocument> {
    match path {
        Some(p) => RequestDocument::template_from_file(p),
        None => Ok(RequestDocument::default()),
    }
}

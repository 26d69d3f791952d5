//! ESMValTool user configuration.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{EvalprepError, Result, UserConfigSettings};

/// Project key under which workflow-produced data is registered.
pub const WORKFLOW_PROJECT: &str = "ESMVal";

/// DRS used for the workflow project.
pub const WORKFLOW_DRS: &str = "BADC";

/// Contents of the user configuration file. Field order is alphabetical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserConfig {
    pub auxiliary_data_dir: String,
    pub config_developer_file: Option<String>,
    pub config_file: Option<String>,
    pub download_dir: String,
    pub drs: BTreeMap<String, String>,
    pub extra_facets_dir: Vec<String>,
    pub max_parallel_tasks: Option<u32>,
    pub output_dir: Option<String>,
    pub remove_preproc_dir: bool,
    pub rootpath: BTreeMap<String, Option<String>>,
}

/// Build the user configuration from settings.
///
/// Paths derived from the share directory are absent when it is not set.
pub fn build_user_config(settings: &UserConfigSettings) -> UserConfig {
    let share = settings.share_dir.as_deref();
    let config_developer_file = share.map(|dir| {
        dir.join("etc")
            .join("config-developer.yml")
            .to_string_lossy()
            .into_owned()
    });
    let workflow_root = share.map(|dir| {
        dir.join("work")
            .join("GCModelDev")
            .to_string_lossy()
            .into_owned()
    });

    let mut drs: BTreeMap<String, String> = settings.drs.clone().into_iter().collect();
    drs.insert(WORKFLOW_PROJECT.to_string(), WORKFLOW_DRS.to_string());

    let mut rootpath: BTreeMap<String, Option<String>> = settings
        .rootpath
        .iter()
        .map(|(k, v)| (k.clone(), Some(v.clone())))
        .collect();
    rootpath.insert(WORKFLOW_PROJECT.to_string(), workflow_root);

    UserConfig {
        auxiliary_data_dir: String::new(),
        config_developer_file,
        config_file: settings
            .config_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned()),
        download_dir: String::new(),
        drs,
        extra_facets_dir: Vec::new(),
        max_parallel_tasks: settings.max_parallel_tasks,
        output_dir: settings.output_dir.clone(),
        remove_preproc_dir: false,
        rootpath,
    }
}

impl UserConfig {
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| EvalprepError::Parse(format!("Serializing user config: {e}")))
    }
}

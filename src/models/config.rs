//! Configuration models for evalprep.
//!
//! Everything an invocation needs beyond its input documents is
//! parameterized here. The file is read fresh on every invocation.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::DirectRunInputs;

/// Top-level configuration for evalprep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Time window of the evaluation
    #[serde(default)]
    pub window: WindowConfig,

    /// Settings for datasets read from namelists
    #[serde(default)]
    pub datasets: DatasetsConfig,

    /// Fixed fields written onto recipe datasets
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Per-run identity sources
    #[serde(default)]
    pub runs: RunsConfig,

    /// Request assembly inputs
    #[serde(default)]
    pub request: RequestConfig,

    /// ESMValTool user configuration inputs
    #[serde(default)]
    pub user_config: UserConfigSettings,
}

/// Base year and duration of the evaluation window.
///
/// Both may also come from the command line or environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowConfig {
    /// First year of the window
    #[serde(default)]
    pub start_year: Option<i32>,

    /// Number of years covered, at least one
    #[serde(default)]
    pub number_of_years: Option<u32>,
}

/// Settings applied to datasets parsed from namelist files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetsConfig {
    /// Project tag added to every parsed dataset
    #[serde(default = "default_dataset_project")]
    pub project: String,
}

fn default_dataset_project() -> String {
    "CMIP6".to_string()
}

impl Default for DatasetsConfig {
    fn default() -> Self {
        Self {
            project: default_dataset_project(),
        }
    }
}

/// Fixed overlay fields for the reference and evaluation recipe entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default = "default_overlay_project")]
    pub project: String,

    #[serde(default = "default_exp")]
    pub exp: String,

    #[serde(default = "default_overlay_project")]
    pub activity: String,

    /// Written only when set
    #[serde(default)]
    pub institute: Option<String>,
}

fn default_overlay_project() -> String {
    "ESMVal".to_string()
}

fn default_exp() -> String {
    "amip".to_string()
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            project: default_overlay_project(),
            exp: default_exp(),
            activity: default_overlay_project(),
            institute: None,
        }
    }
}

/// Where run identities come from.
///
/// A runs-config table, when given and non-empty, takes precedence over the
/// direct inputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunsConfig {
    /// Path to a JSON runs-config table
    #[serde(default)]
    pub table: Option<PathBuf>,

    #[serde(default)]
    pub reference: DirectRunInputs,

    #[serde(default)]
    pub evaluation: DirectRunInputs,
}

/// Inputs for request assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Defaults template (TOML or JSON, section → key → value)
    #[serde(default)]
    pub template: Option<PathBuf>,

    #[serde(default)]
    pub institution_id: Option<String>,

    #[serde(default)]
    pub root_proc_dir: Option<String>,

    #[serde(default)]
    pub root_data_dir: Option<String>,

    #[serde(default)]
    pub variable_list_file: Option<String>,

    /// Extract raw data before conversion
    #[serde(default = "default_true")]
    pub extract: bool,

    /// Location of already-extracted data; required when `extract` is false
    #[serde(default)]
    pub raw_data_path: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            template: None,
            institution_id: None,
            root_proc_dir: None,
            root_data_dir: None,
            variable_list_file: None,
            extract: default_true(),
            raw_data_path: None,
        }
    }
}

/// Inputs for the ESMValTool user configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfigSettings {
    /// Workflow share directory
    #[serde(default)]
    pub share_dir: Option<PathBuf>,

    /// Where the user configuration file is written
    #[serde(default)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub output_dir: Option<String>,

    #[serde(default)]
    pub max_parallel_tasks: Option<u32>,

    /// Project → directory reference syntax
    #[serde(default)]
    pub drs: IndexMap<String, String>,

    /// Project → root path
    #[serde(default)]
    pub rootpath: IndexMap<String, String>,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// `${VAR}` references inside string values are expanded after parsing.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let mut value = toml::Value::Table(content.parse::<toml::Table>()?);
        expand_string_values(&mut value);
        value.try_into()
    }

    /// Resolve the window parameters, letting explicit overrides win.
    pub fn resolve_window(
        &self,
        start_year: Option<i32>,
        number_of_years: Option<u32>,
    ) -> Result<(i32, u32), ConfigError> {
        let start = start_year.or(self.window.start_year);
        let years = number_of_years.or(self.window.number_of_years);
        match (start, years) {
            (Some(s), Some(n)) => Ok((s, n)),
            (s, n) => {
                let mut missing = Vec::new();
                if s.is_none() {
                    missing.push("start_year");
                }
                if n.is_none() {
                    missing.push("number_of_years");
                }
                Err(ConfigError::MissingWindow(missing.join(", ")))
            }
        }
    }
}

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Expand environment variables in a string.
///
/// Supports ${VAR_NAME} syntax.
/// If the variable is not set, the placeholder is left unchanged.
pub fn expand_env_vars(s: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(s, |cap: &regex::Captures<'_>| {
            std::env::var(&cap[1]).unwrap_or_else(|_| cap[0].to_string())
        })
        .into_owned()
}

/// Expand `${VAR}` in every string leaf, leaving keys and structure alone.
fn expand_string_values(value: &mut toml::Value) {
    match value {
        toml::Value::String(s) => *s = expand_env_vars(s),
        toml::Value::Array(items) => items.iter_mut().for_each(expand_string_values),
        toml::Value::Table(table) => {
            for (_, item) in table.iter_mut() {
                expand_string_values(item);
            }
        }
        _ => {}
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(
        "Missing window setting(s): {0} (set [window] in config, a CLI flag, or the environment)"
    )]
    MissingWindow(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_apply_to_empty_config() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.datasets.project, "CMIP6");
        assert_eq!(config.overlay.project, "ESMVal");
        assert_eq!(config.overlay.exp, "amip");
        assert_eq!(config.overlay.activity, "ESMVal");
        assert!(config.overlay.institute.is_none());
        assert!(config.request.extract);
        assert!(config.runs.table.is_none());
    }

    #[test]
    fn test_parses_runs_and_request_sections() {
        let config = Config::from_toml_str(
            r#"
[window]
start_year = 1993
number_of_years = 10

[runs.reference]
model_id = "HadGEM3-GC31-LL"
suite_id = "u-bv526"
calendar = "360_day"
variant_label = "r5i1p1f3"

[request]
institution_id = "MOHC"
extract = false
raw_data_path = "/data/raw"
"#,
        )
        .unwrap();
        assert_eq!(config.runs.reference.suite_id.as_deref(), Some("u-bv526"));
        assert!(config.runs.evaluation.suite_id.is_none());
        assert!(!config.request.extract);
        assert_eq!(config.resolve_window(None, None).unwrap(), (1993, 10));
    }

    #[test]
    fn test_window_overrides_win() {
        let config = Config::from_toml_str("[window]\nstart_year = 1993\nnumber_of_years = 10\n")
            .unwrap();
        assert_eq!(config.resolve_window(Some(2000), None).unwrap(), (2000, 10));
        assert_eq!(config.resolve_window(None, Some(1)).unwrap(), (1993, 1));
    }

    #[test]
    fn test_missing_window_names_fields() {
        let config = Config::default();
        let err = config.resolve_window(None, None).unwrap_err();
        assert!(err.to_string().contains("start_year, number_of_years"));
    }

    #[test]
    fn test_expand_env_vars_leaves_unknown_placeholders() {
        // SAFETY: test-only variable with a unique name.
        unsafe { std::env::set_var("EVALPREP_TEST_SHARE", "/share") };
        let expanded = expand_env_vars("${EVALPREP_TEST_SHARE}/etc ${EVALPREP_UNSET_VAR}");
        assert_eq!(expanded, "/share/etc ${EVALPREP_UNSET_VAR}");
    }

    #[test]
    fn test_env_values_are_never_parsed_as_toml() {
        // SAFETY: test-only variables with unique names.
        unsafe {
            std::env::set_var("EVALPREP_TEST_QUOTED", r#"/data/run "a""#);
            std::env::set_var(
                "EVALPREP_TEST_MULTILINE",
                "/x\"\nextract = false\nraw_data_path = \"/elsewhere",
            );
        }
        let config = Config::from_toml_str(
            r#"
[request]
root_proc_dir = "${EVALPREP_TEST_QUOTED}"
root_data_dir = "${EVALPREP_TEST_MULTILINE}"
"#,
        )
        .unwrap();
        assert_eq!(config.request.root_proc_dir.as_deref(), Some(r#"/data/run "a""#));
        assert_eq!(
            config.request.root_data_dir.as_deref(),
            Some("/x\"\nextract = false\nraw_data_path = \"/elsewhere")
        );
        assert!(config.request.extract);
        assert!(config.request.raw_data_path.is_none());
    }

    #[test]
    fn test_nested_string_values_are_expanded() {
        // SAFETY: test-only variable with a unique name.
        unsafe { std::env::set_var("EVALPREP_TEST_ROOTPATH", "/badc") };
        let config = Config::from_toml_str(
            "[user_config.rootpath]\nCMIP6 = \"${EVALPREP_TEST_ROOTPATH}/cmip6\"\n",
        )
        .unwrap();
        assert_eq!(
            config.user_config.rootpath.get("CMIP6").map(String::as_str),
            Some("/badc/cmip6")
        );
    }

    #[test]
    fn test_from_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
        assert!(err.to_string().contains("missing.toml"));
    }
}

//! Request assembly.
//!
//! The request is the defaults template with the dynamically resolved keys
//! overwritten. The template itself is never modified.

use tracing::info;

use super::RequestDocument;
use crate::models::{EvalprepError, RequestConfig, Result, RunMetadata};
use crate::window::IsoWindow;

/// Directly supplied scalar inputs of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInputs {
    pub institution_id: String,
    pub root_proc_dir: String,
    pub root_data_dir: String,
    pub variable_list_file: String,
    /// Extract raw data before conversion
    pub extract: bool,
    /// Replaces `root_data_dir` when extraction is skipped
    pub raw_data_path: Option<String>,
}

impl RequestInputs {
    /// Collect inputs from configuration, naming every absent field.
    pub fn from_config(config: &RequestConfig) -> Result<Self> {
        let fields = [
            ("institution_id", &config.institution_id),
            ("root_proc_dir", &config.root_proc_dir),
            ("root_data_dir", &config.root_data_dir),
            ("variable_list_file", &config.variable_list_file),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, v)| v.as_deref().is_none_or(|s| s.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(EvalprepError::missing("request", missing));
        }

        let take = |v: &Option<String>| v.clone().unwrap_or_default();
        Ok(Self {
            institution_id: take(&config.institution_id),
            root_proc_dir: take(&config.root_proc_dir),
            root_data_dir: take(&config.root_data_dir),
            variable_list_file: take(&config.variable_list_file),
            extract: config.extract,
            raw_data_path: config
                .raw_data_path
                .clone()
                .filter(|p| !p.trim().is_empty()),
        })
    }
}

/// Builds complete requests from a defaults template.
#[derive(Debug, Clone)]
pub struct RequestAssembler<'a> {
    template: &'a RequestDocument,
}

impl<'a> RequestAssembler<'a> {
    pub fn new(template: &'a RequestDocument) -> Self {
        Self { template }
    }

    /// Build the request for one run.
    ///
    /// With `extract` false a raw data path is required; it replaces
    /// `root_data_dir` and `conversion.skip_extract` is set.
    pub fn assemble(
        &self,
        run: &RunMetadata,
        window: &IsoWindow,
        inputs: &RequestInputs,
    ) -> Result<RequestDocument> {
        let root_data_dir = if inputs.extract {
            inputs.root_data_dir.clone()
        } else {
            inputs.raw_data_path.clone().ok_or_else(|| {
                EvalprepError::InvalidState(
                    "extract is disabled but no raw_data_path was supplied".to_string(),
                )
            })?
        };

        let mut request = self.template.normalized_sections();

        request.set("metadata", "calendar", &run.calendar);
        request.set("metadata", "institution_id", &inputs.institution_id);
        request.set("metadata", "model_id", &run.model_id);
        request.set("metadata", "variant_label", &run.variant_label);

        request.set("common", "root_proc_dir", &inputs.root_proc_dir);
        request.set("common", "root_data_dir", root_data_dir);
        request.set("common", "workflow_basename", &run.suite_id);

        request.set("data", "start_date", &window.start_date);
        request.set("data", "end_date", &window.end_date);
        request.set("data", "variable_list_file", &inputs.variable_list_file);

        if !inputs.extract {
            request.set("conversion", "skip_extract", "True");
        }

        info!(
            model_id = %run.model_id,
            suite_id = %run.suite_id,
            extract = inputs.extract,
            "Assembled request"
        );
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::iso_window;

    fn template() -> RequestDocument {
        RequestDocument::from_toml_str(
            r#"
[metadata]
calendar = "gregorian"
mip_era = "GCModelDev"
experiment_id = "amip"

[common]
workflow_basename = "static-name"
mip_table_dir = "/etc/mip_tables"

[misc]
atmos_timestep = "1200"

[netcdf_global_attributes]
source = "model"
"#,
        )
        .unwrap()
    }

    fn run() -> RunMetadata {
        RunMetadata {
            model_id: "UKESM1-0-LL".to_string(),
            suite_id: "u-az513".to_string(),
            calendar: "360_day".to_string(),
            variant_label: "r5i1p1f3".to_string(),
            alias: "u-az513".to_string(),
        }
    }

    fn inputs() -> RequestInputs {
        RequestInputs {
            institution_id: "MOHC".to_string(),
            root_proc_dir: "/proc".to_string(),
            root_data_dir: "/data".to_string(),
            variable_list_file: "/share/etc/variables.txt".to_string(),
            extract: true,
            raw_data_path: None,
        }
    }

    #[test]
    fn test_dynamic_keys_override_template() {
        let template = template();
        let request = RequestAssembler::new(&template)
            .assemble(&run(), &iso_window(1993, 1).unwrap(), &inputs())
            .unwrap();

        assert_eq!(request.get("metadata", "calendar"), Some("360_day"));
        assert_eq!(request.get("metadata", "institution_id"), Some("MOHC"));
        assert_eq!(request.get("metadata", "model_id"), Some("UKESM1-0-LL"));
        assert_eq!(request.get("metadata", "variant_label"), Some("r5i1p1f3"));
        assert_eq!(request.get("common", "workflow_basename"), Some("u-az513"));
        assert_eq!(request.get("common", "root_data_dir"), Some("/data"));
        assert_eq!(request.get("data", "start_date"), Some("1993-01-01T00:00:00"));
        assert_eq!(request.get("data", "end_date"), Some("1994-01-01T00:00:00"));
        assert_eq!(
            request.get("data", "variable_list_file"),
            Some("/share/etc/variables.txt")
        );
        assert_eq!(request.get("conversion", "skip_extract"), None);
    }

    #[test]
    fn test_template_values_pass_through() {
        let template = template();
        let request = RequestAssembler::new(&template)
            .assemble(&run(), &iso_window(1993, 1).unwrap(), &inputs())
            .unwrap();
        assert_eq!(request.get("metadata", "mip_era"), Some("GCModelDev"));
        assert_eq!(request.get("misc", "atmos_timestep"), Some("1200"));
        assert_eq!(request.get("netcdf_global_attributes", "source"), Some("model"));
        let names: Vec<_> = request.section_names().collect();
        assert_eq!(
            names,
            vec!["metadata", "common", "data", "misc", "conversion", "netcdf_global_attributes"]
        );
    }

    #[test]
    fn test_template_is_not_mutated() {
        let template = template();
        let before = template.clone();
        RequestAssembler::new(&template)
            .assemble(&run(), &iso_window(1993, 1).unwrap(), &inputs())
            .unwrap();
        assert_eq!(template, before);
        assert_eq!(template.get("common", "workflow_basename"), Some("static-name"));
    }

    #[test]
    fn test_skip_extract_uses_raw_data_path() {
        let template = template();
        let inputs = RequestInputs {
            extract: false,
            raw_data_path: Some("/raw".to_string()),
            ..inputs()
        };
        let request = RequestAssembler::new(&template)
            .assemble(&run(), &iso_window(1993, 1).unwrap(), &inputs)
            .unwrap();
        assert_eq!(request.get("common", "root_data_dir"), Some("/raw"));
        assert_eq!(request.get("conversion", "skip_extract"), Some("True"));
    }

    #[test]
    fn test_skip_extract_without_path_is_invalid_state() {
        let template = template();
        let inputs = RequestInputs {
            extract: false,
            ..inputs()
        };
        let err = RequestAssembler::new(&template)
            .assemble(&run(), &iso_window(1993, 1).unwrap(), &inputs)
            .unwrap_err();
        assert!(matches!(err, EvalprepError::InvalidState(_)));
    }

    #[test]
    fn test_inputs_from_config_name_missing_fields() {
        let config = RequestConfig {
            institution_id: Some("MOHC".to_string()),
            root_data_dir: Some(" ".to_string()),
            ..RequestConfig::default()
        };
        let err = RequestInputs::from_config(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing configuration for request: root_proc_dir, root_data_dir, variable_list_file"
        );
    }
}

//! Request documents: section → key → value, all values strings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

use crate::models::{EvalprepError, Result};

/// Sections every request carries, in output order.
pub const REQUIRED_SECTIONS: [&str; 5] = ["metadata", "common", "data", "misc", "conversion"];

/// Sections carried over from the template when present.
pub const OPTIONAL_SECTIONS: [&str; 2] = ["netcdf_global_attributes", "inventory"];

/// One request section.
pub type Section = IndexMap<String, String>;

/// A post-processing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestDocument {
    sections: IndexMap<String, Section>,
}

/// How a request is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFormat {
    Json,
    Ini,
}

impl RequestFormat {
    /// `.cfg` and `.ini` are INI; anything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("cfg" | "ini") => Self::Ini,
            _ => Self::Json,
        }
    }
}

impl RequestDocument {
    /// Load a defaults template. TOML for `.toml`, JSON otherwise.
    pub fn template_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EvalprepError::io(format!("reading request template {}", path.display()), e)
        })?;

        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| EvalprepError::Parse(format!("Invalid request template: {e}")))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| EvalprepError::Parse(format!("Invalid request template: {e}")))
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Value at `section.key`.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key).map(String::as_str)
    }

    /// Set `section.key`, creating the section when needed.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Section names in document order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Copy with sections reordered: required first, then optional, then
    /// anything else the template carried. Missing required sections are
    /// added empty.
    pub(crate) fn normalized_sections(&self) -> Self {
        let mut sections =
            IndexMap::with_capacity(self.sections.len().max(REQUIRED_SECTIONS.len()));
        for name in REQUIRED_SECTIONS {
            sections.insert(
                name.to_string(),
                self.sections.get(name).cloned().unwrap_or_default(),
            );
        }
        for name in OPTIONAL_SECTIONS {
            if let Some(section) = self.sections.get(name) {
                sections.insert(name.to_string(), section.clone());
            }
        }
        for (name, section) in &self.sections {
            if !sections.contains_key(name) {
                sections.insert(name.clone(), section.clone());
            }
        }
        Self { sections }
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EvalprepError::Parse(format!("Serializing request: {e}")))
    }

    /// `[section]` headers followed by `key = value` lines.
    pub fn to_ini_string(&self) -> String {
        let mut out = String::new();
        for (i, (name, section)) in self.sections.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "[{name}]");
            for (key, value) in section {
                let _ = writeln!(out, "{key} = {value}");
            }
        }
        out
    }

    pub fn render(&self, format: RequestFormat) -> Result<String> {
        match format {
            RequestFormat::Json => self.to_json_string(),
            RequestFormat::Ini => Ok(self.to_ini_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_template() {
        let doc = RequestDocument::from_toml_str(
            "[metadata]\nmip_era = \"GCModelDev\"\n\n[misc]\natmos_timestep = \"1200\"\n",
        )
        .unwrap();
        assert_eq!(doc.get("metadata", "mip_era"), Some("GCModelDev"));
        assert_eq!(doc.get("misc", "atmos_timestep"), Some("1200"));
    }

    #[test]
    fn test_non_string_value_is_rejected() {
        assert!(matches!(
            RequestDocument::from_toml_str("[misc]\natmos_timestep = 1200\n"),
            Err(EvalprepError::Parse(_))
        ));
    }

    #[test]
    fn test_normalized_sections_order() {
        let doc = RequestDocument::from_json_str(
            r#"{"inventory": {"db": "x"}, "custom": {}, "data": {"streams": "ap5"}}"#,
        )
        .unwrap()
        .normalized_sections();
        let names: Vec<_> = doc.section_names().collect();
        assert_eq!(
            names,
            vec!["metadata", "common", "data", "misc", "conversion", "inventory", "custom"]
        );
        assert_eq!(doc.get("data", "streams"), Some("ap5"));
    }

    #[test]
    fn test_ini_rendering() {
        let mut doc = RequestDocument::default();
        doc.set("metadata", "calendar", "360_day");
        doc.set("metadata", "model_id", "UKESM1-0-LL");
        doc.set("conversion", "skip_extract", "True");
        assert_eq!(
            doc.to_ini_string(),
            "[metadata]\ncalendar = 360_day\nmodel_id = UKESM1-0-LL\n\n[conversion]\nskip_extract = True\n"
        );
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(RequestFormat::from_path(Path::new("request.cfg")), RequestFormat::Ini);
        assert_eq!(RequestFormat::from_path(Path::new("request.json")), RequestFormat::Json);
    }
}

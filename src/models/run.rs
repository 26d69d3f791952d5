//! Per-run identity types.
//!
//! A run is addressed by a role (reference or evaluation) and resolved into
//! [`RunMetadata`] from either a runs-config table or direct inputs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical role a run plays in an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunRole {
    /// The run being compared against
    Reference,
    /// The run under evaluation
    Evaluation,
}

impl RunRole {
    /// All roles, in recipe order.
    pub const ALL: [RunRole; 2] = [RunRole::Reference, RunRole::Evaluation];

    /// Run label used to look this role up in a runs-config table.
    pub fn label(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Evaluation => "evaluation",
        }
    }
}

impl fmt::Display for RunRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical identity of one model run.
///
/// The four required fields are non-empty once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Model identifier (e.g. "HadGEM3-GC31-LL")
    pub model_id: String,

    /// Workflow instance identifier (e.g. "u-bv526")
    pub suite_id: String,

    /// Model calendar (e.g. "360_day")
    pub calendar: String,

    /// Ensemble member (e.g. "r1i1p1f3")
    pub variant_label: String,

    /// Display label; the suite id unless supplied separately
    pub alias: String,
}

/// Run identity supplied directly through configuration.
///
/// Every field is optional here; resolution decides what is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectRunInputs {
    #[serde(default)]
    pub model_id: Option<String>,

    #[serde(default)]
    pub suite_id: Option<String>,

    #[serde(default)]
    pub calendar: Option<String>,

    #[serde(default)]
    pub variant_label: Option<String>,

    /// Explicit plot label; becomes the alias when non-empty
    #[serde(default)]
    pub label_for_plots: Option<String>,
}

/// One raw entry of a runs-config table.
///
/// Accepts the lower-snake field names as well as the legacy upper-case
/// ones. When both spellings are present the lower-snake value is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRunEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, rename = "MODEL_ID", skip_serializing_if = "Option::is_none")]
    pub legacy_model_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_id: Option<String>,
    #[serde(default, rename = "SUITE_ID", skip_serializing_if = "Option::is_none")]
    pub legacy_suite_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar: Option<String>,
    #[serde(default, rename = "CALENDAR", skip_serializing_if = "Option::is_none")]
    pub legacy_calendar: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_label: Option<String>,
    #[serde(
        default,
        rename = "VARIANT_LABEL",
        skip_serializing_if = "Option::is_none"
    )]
    pub legacy_variant_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_for_plots: Option<String>,
}

impl DirectRunInputs {
    /// Trim every field and drop the blank ones.
    pub fn normalized(&self) -> DirectRunInputs {
        DirectRunInputs {
            model_id: non_empty(&self.model_id),
            suite_id: non_empty(&self.suite_id),
            calendar: non_empty(&self.calendar),
            variant_label: non_empty(&self.variant_label),
            label_for_plots: non_empty(&self.label_for_plots),
        }
    }
}

fn prefer(primary: &Option<String>, legacy: &Option<String>) -> Option<String> {
    non_empty(primary).or_else(|| non_empty(legacy))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl RawRunEntry {
    /// Collapse both spellings into direct inputs.
    pub fn normalize(&self) -> DirectRunInputs {
        DirectRunInputs {
            model_id: prefer(&self.model_id, &self.legacy_model_id),
            suite_id: prefer(&self.suite_id, &self.legacy_suite_id),
            calendar: prefer(&self.calendar, &self.legacy_calendar),
            variant_label: prefer(&self.variant_label, &self.legacy_variant_label),
            label_for_plots: non_empty(&self.label_for_plots),
        }
    }

    /// The suite id this entry resolves to, if any.
    pub fn resolved_suite_id(&self) -> Option<String> {
        prefer(&self.suite_id, &self.legacy_suite_id)
    }
}

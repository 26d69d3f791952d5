//! Recipe documents.
//!
//! The recipe is kept as an untyped YAML tree; only `datasets` and
//! `diagnostics` are interpreted. Everything else passes through unchanged.

use serde_yaml::{Mapping, Sequence, Value};
use std::path::Path;

use crate::models::{EvalprepError, Result, RunRole};

/// Key of the dataset list in a recipe.
pub const DATASETS_KEY: &str = "datasets";

/// Position of a role's entry in the recipe dataset list.
pub fn dataset_slot(role: RunRole) -> usize {
    match role {
        RunRole::Reference => 0,
        RunRole::Evaluation => 1,
    }
}

/// An evaluation recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDocument {
    root: Value,
}

impl RecipeDocument {
    /// Parse a recipe; the top level must be a mapping.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(content)
            .map_err(|e| EvalprepError::Parse(format!("Invalid recipe: {e}")))?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> Result<Self> {
        if !root.is_mapping() {
            return Err(EvalprepError::Validation(
                "recipe must be a mapping at the top level".to_string(),
            ));
        }
        Ok(Self { root })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EvalprepError::io(format!("reading recipe {}", path.display()), e))?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(&self.root)
            .map_err(|e| EvalprepError::Parse(format!("Serializing recipe: {e}")))
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// The dataset list, if present and a sequence.
    pub fn datasets(&self) -> Option<&Sequence> {
        self.root.get(DATASETS_KEY).and_then(Value::as_sequence)
    }

    /// Dataset entry for a role, after [`Self::validate_roles`] has passed.
    pub fn role_dataset(&self, role: RunRole) -> Option<&Mapping> {
        self.datasets()?.get(dataset_slot(role))?.as_mapping()
    }

    /// Check that every role has a mapping entry at its slot.
    pub fn validate_roles(&self) -> Result<()> {
        let datasets = self.datasets().ok_or_else(|| {
            EvalprepError::Validation("recipe has no 'datasets' sequence".to_string())
        })?;

        let needed = RunRole::ALL.iter().map(|r| dataset_slot(*r) + 1).max().unwrap_or(0);
        if datasets.len() < needed {
            return Err(EvalprepError::Validation(format!(
                "recipe needs at least {needed} datasets (reference, evaluation), found {}",
                datasets.len()
            )));
        }

        for role in RunRole::ALL {
            let slot = dataset_slot(role);
            if !datasets[slot].is_mapping() {
                return Err(EvalprepError::Validation(format!(
                    "{role} dataset (entry {slot}) is not a mapping"
                )));
            }
        }
        Ok(())
    }

    /// Mutable dataset list, inserting an empty one when absent.
    pub(crate) fn datasets_mut_or_insert(&mut self) -> Result<&mut Sequence> {
        let root = self.root.as_mapping_mut().ok_or_else(|| {
            EvalprepError::Validation("recipe must be a mapping at the top level".to_string())
        })?;
        root.entry(Value::from(DATASETS_KEY))
            .or_insert_with(|| Value::Sequence(Sequence::new()))
            .as_sequence_mut()
            .ok_or_else(|| {
                EvalprepError::Validation("recipe 'datasets' is not a sequence".to_string())
            })
    }

    /// Mutable mapping entry for a role. Call after validation.
    pub(crate) fn role_dataset_mut(&mut self, role: RunRole) -> Result<&mut Mapping> {
        self.root
            .get_mut(DATASETS_KEY)
            .and_then(Value::as_sequence_mut)
            .and_then(|d| d.get_mut(dataset_slot(role)))
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| EvalprepError::Validation(format!("{role} dataset is missing")))
    }
}

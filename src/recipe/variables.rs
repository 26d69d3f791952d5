//! Variables required by a recipe.
//!
//! ```yaml
//! diagnostics:
//!   radiation_budget:
//!     variables:
//!       rss: {mip: Emon}
//!       rsdt: {mip: Amon}
//! ```
//!
//! yields `Emon/rss` and `Amon/rsdt`.

use indexmap::IndexSet;
use serde_yaml::Value;

use super::RecipeDocument;
use crate::models::{EvalprepError, Result};

/// Unique `<mip>/<variable>` entries in first-occurrence order.
pub fn recipe_variables(recipe: &RecipeDocument) -> Result<Vec<String>> {
    let diagnostics = recipe
        .as_value()
        .get("diagnostics")
        .and_then(Value::as_mapping)
        .ok_or_else(|| {
            EvalprepError::Validation("recipe has no 'diagnostics' mapping".to_string())
        })?;

    let mut variables = IndexSet::new();
    for (diagnostic, body) in diagnostics {
        let Some(vars) = body.get("variables").and_then(Value::as_mapping) else {
            continue;
        };
        for (name, spec) in vars {
            let name = scalar(name);
            let mip = spec.get("mip").and_then(Value::as_str).ok_or_else(|| {
                EvalprepError::Validation(format!(
                    "variable '{name}' in diagnostic '{}' has no mip",
                    scalar(diagnostic)
                ))
            })?;
            variables.insert(format!("{mip}/{name}"));
        }
    }

    Ok(variables.into_iter().collect())
}

/// Newline-separated with a trailing newline.
pub fn render_variables(variables: &[String]) -> String {
    let mut out = variables.join("\n");
    out.push('\n');
    out
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => format!("{other:?}"),
    }
}

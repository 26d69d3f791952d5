//! Recipe module - documents consumed by the evaluation tool.
//!
//! - `document`: the recipe tree and its reference/evaluation slots
//! - `merger`: run metadata overlay and extra datasets
//! - `variables`: the `<mip>/<variable>` list a recipe needs
//! - `user_config`: the tool's user configuration file

mod document;
mod merger;
mod user_config;
mod variables;

pub use document::*;
pub use merger::*;
pub use user_config::*;
pub use variables::*;

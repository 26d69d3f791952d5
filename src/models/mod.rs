//! Core data models for evalprep.
//!
//! - Configuration surface (`Config`)
//! - Run identity (`RunMetadata`, `RunRole`, raw table entries)
//! - Dataset records and their facet values
//! - The error taxonomy shared by every component

mod config;
mod dataset;
mod error;
mod run;

pub use config::*;
pub use dataset::*;
pub use error::*;
pub use run::*;

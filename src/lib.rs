//! evalprep - run-specific configuration for climate-model evaluation.
//!
//! ## Architecture
//!
//! Namelist text flows through:
//! - **Namelist parser**: text → one facet string per record
//! - **Facet parser**: record → ordered `key=value` mapping
//! - **Enrichment**: facets + inclusive window + project tag → dataset record
//!
//! Independently, the **run resolver** turns a run label into run metadata,
//! from a runs-config table or from direct inputs. Its output feeds:
//! - **Recipe merger**: overlays reference/evaluation runs onto a recipe
//! - **Request assembler**: defaults template + run + ISO window → request
//!
//! ## Guarantees
//!
//! - Windows come in two conventions that are distinct types
//! - Every failure aborts before any artifact is written
//! - Configuration and tables are loaded per invocation, never cached

pub mod models;
pub mod namelist;
pub mod output;
pub mod pipeline;
pub mod recipe;
pub mod request;
pub mod runs;
pub mod window;

// Re-exports for convenience
pub use models::{Config, DatasetRecord, EvalprepError, Result, RunMetadata, RunRole};
pub use recipe::{RecipeDatasetMerger, RecipeDocument};
pub use request::{RequestAssembler, RequestDocument};
pub use runs::{RunMetadataResolver, RunsConfigTable};
pub use window::{InclusiveWindow, IsoWindow, WindowSpec, inclusive_window, iso_window};

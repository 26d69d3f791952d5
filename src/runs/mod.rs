//! Runs module - where per-run identity comes from.

mod resolver;
mod table;

pub use resolver::*;
pub use table::*;

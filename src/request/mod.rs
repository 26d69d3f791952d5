//! Request module - documents consumed by the post-processing tool.

mod assembler;
mod document;

pub use assembler::*;
pub use document::*;

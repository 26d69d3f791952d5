//! Error types for evalprep.
//!
//! Taxonomy:
//! - Input rejected: malformed namelists, missing or unknown run configuration
//! - Document rejected: recipes or requests that cannot be built safely
//! - Infrastructure: file system and (de)serialization failures

use thiserror::Error;

/// Top-level error type for evalprep.
///
/// Every variant aborts the invocation before any artifact is written.
#[derive(Debug, Error)]
pub enum EvalprepError {
    // ═══════════════════════════════════════════════════════════════════
    // INPUT REJECTED: the caller supplied something unusable
    // ═══════════════════════════════════════════════════════════════════

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Missing configuration for {context}: {}", .fields.join(", "))]
    MissingConfiguration {
        context: String,
        fields: Vec<String>,
    },

    #[error("No run configuration found for '{label}'; available: {}", .available.join(", "))]
    Lookup {
        label: String,
        available: Vec<String>,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    // ═══════════════════════════════════════════════════════════════════
    // DOCUMENT REJECTED: structure does not satisfy the contract
    // ═══════════════════════════════════════════════════════════════════

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    // ═══════════════════════════════════════════════════════════════════
    // INFRASTRUCTURE: surfaced unchanged, never retried
    // ═══════════════════════════════════════════════════════════════════

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl EvalprepError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a missing-configuration error for the given fields.
    pub fn missing<I, S>(context: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingConfiguration {
            context: context.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result type alias for evalprep.
pub type Result<T> = std::result::Result<T, EvalprepError>;

//! Error types for configuration and format operations
//!
//! Only configuration-integrity problems and format plumbing are errors. Problems in user
//! markup are reported as warnings on a [`crate::validator::ValidationContext`].

use thiserror::Error;

/// Errors raised by the bitmark library
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitmarkError {
    /// A bit type has no entry in the configuration tables
    #[error("No config found for bit: ALIAS:{alias}, ROOT:{root}")]
    BitConfigNotFound { alias: String, root: String },

    /// A table entry references a config key that does not exist
    #[error("No config found for {kind} config key '{key}'")]
    ConfigKeyNotFound { kind: &'static str, key: String },

    /// A bit's base type chain is broken or cyclic
    #[error("Invalid inheritance for bit '{bit}': {reason}")]
    InvalidInheritance { bit: String, reason: String },

    /// The configuration tables could not be decoded
    #[error("Invalid configuration tables: {0}")]
    InvalidTables(String),

    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),

    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Format does not support the operation
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

impl From<serde_json::Error> for BitmarkError {
    fn from(err: serde_json::Error) -> Self {
        BitmarkError::ParseError(err.to_string())
    }
}

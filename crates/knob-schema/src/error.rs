//! Schema and validation error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the registry and schema resolution.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Requested plugin id is not in the registry.
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// A base or composed schema is not a valid JSON Schema.
    #[error("Invalid schema for {id}: {reason}")]
    InvalidSchema { id: String, reason: String },

    /// An override fragment was rejected by the merge policy.
    #[error("Invalid override for {id} key '{key}': {reason}")]
    InvalidOverride {
        id: String,
        key: String,
        reason: String,
    },

    /// A schema, package manifest, or override document failed to load.
    #[error("Failed loading {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },
}

/// Errors from the settings write gate, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Request body is not `{"raw": "<string>"}`.
    #[error("Invalid format for JSON payload. Must be in the form {{\"raw\": ...}}: {0}")]
    Envelope(String),

    /// `raw` is not a well-formed JSON5 object.
    #[error("Failed parsing settings: {0}")]
    Syntax(String),

    /// Parsed settings violate the plugin schema.
    #[error("Failed validating input: {}", errors.join("; "))]
    Schema {
        /// Individual error messages from the validator.
        errors: Vec<String>,
    },
}

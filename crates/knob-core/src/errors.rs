//! Cross-cutting error types for Knob.
//!
//! Domain-specific errors (`SchemaError`, `StoreError`, ...) live in their
//! respective crates and converge into `ServiceError` in `knob-service`.

use thiserror::Error;

/// Errors raised while parsing a plugin id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The id does not contain exactly one `:` separator.
    #[error("Plugin id '{0}' must have the form <package>:<plugin>")]
    Separator(String),

    /// The package or plugin half is empty.
    #[error("Plugin id '{0}' has an empty package or plugin name")]
    EmptyPart(String),

    /// A segment would escape its directory or contains forbidden characters.
    #[error("Plugin id '{0}' contains an invalid path segment")]
    InvalidSegment(String),
}

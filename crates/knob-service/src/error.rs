//! Service-level errors and their transport mapping.

use knob_config::ConfigError;
use knob_schema::{SchemaError, ValidationError};
use knob_store::StoreError;
use serde_json::{Value, json};
use thiserror::Error;

/// Every failure a settings operation can report.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Unknown or malformed plugin id.
    #[error("Schema not found: {0}")]
    NotFound(String),

    #[error("Invalid format for JSON payload. Must be in the form {{\"raw\": ...}}: {0}")]
    Envelope(String),

    #[error("Failed parsing settings: {0}")]
    Syntax(String),

    #[error("Failed validating input: {}", errors.join("; "))]
    SchemaValidation { errors: Vec<String> },

    /// Base schema or overrides are broken. Server-side.
    #[error(transparent)]
    Schema(SchemaError),

    #[error("Settings store failed: {0}")]
    StoreIo(String),

    #[error("Failed encoding settings for {id}: {reason}")]
    StoreEncode { id: String, reason: String },

    /// Persisted settings exist but cannot be read back.
    #[error("Stored settings for {id} are unreadable: {reason}")]
    StoreCorruption { id: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ServiceError {
    /// HTTP status a transport should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Envelope(_) | Self::Syntax(_) | Self::SchemaValidation { .. } => 400,
            Self::Schema(_)
            | Self::StoreIo(_)
            | Self::StoreEncode { .. }
            | Self::StoreCorruption { .. }
            | Self::Config(_) => 500,
        }
    }

    /// Stable machine-readable error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Envelope(_) => "invalid_payload",
            Self::Syntax(_) => "invalid_json",
            Self::SchemaValidation { .. } => "schema_validation",
            Self::Schema(_) => "schema",
            Self::StoreIo(_) => "store_io",
            Self::StoreEncode { .. } => "store_encode",
            Self::StoreCorruption { .. } => "store_corruption",
            Self::Config(_) => "config",
        }
    }

    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Error body for transports: `{"error", "message", "details"}`.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let details = match self {
            Self::SchemaValidation { errors } => errors.clone(),
            _ => Vec::new(),
        };
        json!({
            "error": self.kind(),
            "message": self.to_string(),
            "details": details,
        })
    }
}

impl From<SchemaError> for ServiceError {
    fn from(error: SchemaError) -> Self {
        match error {
            SchemaError::NotFound(id) => Self::NotFound(id),
            other => Self::Schema(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::Envelope(message) => Self::Envelope(message),
            ValidationError::Syntax(message) => Self::Syntax(message),
            ValidationError::Schema { errors } => Self::SchemaValidation { errors },
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Corrupt { id, reason } => Self::StoreCorruption { id, reason },
            StoreError::Encode { id, reason } => Self::StoreEncode { id, reason },
            io @ StoreError::Io { .. } => Self::StoreIo(io.to_string()),
        }
    }
}

//! Store error types.

use thiserror::Error;

/// Errors from settings persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed to read or write. Never retried by the store.
    #[error("Store I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialized for writing. Nothing was written.
    #[error("Failed encoding settings for {id}: {reason}")]
    Encode { id: String, reason: String },

    /// A persisted record exists but cannot be decoded.
    #[error("Corrupt settings for {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

impl StoreError {
    pub(crate) fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            key: key.into(),
            source,
        }
    }
}

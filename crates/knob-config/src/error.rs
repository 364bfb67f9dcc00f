//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML or environment layer failed to parse or extract.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A setting needed by the chosen store or loader is empty.
    #[error("'{section}' must be set")]
    NotConfigured { section: String },

    /// An explicitly requested config file is absent.
    #[error("Config file {} does not exist", .0.display())]
    MissingFile(PathBuf),
}

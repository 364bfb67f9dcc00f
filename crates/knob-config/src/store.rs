//! Settings store backend selection.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendKind {
    /// One file per plugin under `paths.settings_dir`.
    #[default]
    Fs,
    /// Process-local, lost on exit.
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackendKind,
}

//! Filesystem locations for schemas, overrides, and stored settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the deployment override document inside `app_settings_dir`.
pub const OVERRIDES_FILE: &str = "overrides.json";

/// JSON5 fallback used when `overrides.json` is absent.
pub const OVERRIDES_FILE_JSON5: &str = "overrides.json5";

/// One override document location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverridePath {
    pub path: PathBuf,
    /// Set for explicit `override_files` entries, which must exist.
    pub required: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Root of builtin plugin schemas: `<schemas_dir>/<package>/<plugin>.json`.
    #[serde(default)]
    pub schemas_dir: String,

    /// Root of persisted user settings (filesystem store).
    #[serde(default)]
    pub settings_dir: String,

    /// Directory holding the deployment `overrides.json`.
    #[serde(default)]
    pub app_settings_dir: String,

    /// Directories scanned for federated extensions.
    #[serde(default)]
    pub labextensions_path: Vec<String>,

    /// Extra override documents, applied after `overrides.json` in order.
    #[serde(default)]
    pub override_files: Vec<String>,
}

impl PathsConfig {
    /// A schemas directory is the minimum needed to build a registry.
    pub fn is_configured(&self) -> bool {
        !self.schemas_dir.is_empty()
    }

    pub fn schemas_dir(&self) -> Option<PathBuf> {
        non_empty(&self.schemas_dir)
    }

    pub fn app_settings_dir(&self) -> Option<PathBuf> {
        non_empty(&self.app_settings_dir)
    }

    /// Settings directory, required by the filesystem store.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` when `settings_dir` is empty.
    pub fn require_settings_dir(&self) -> Result<PathBuf, ConfigError> {
        non_empty(&self.settings_dir).ok_or_else(|| ConfigError::NotConfigured {
            section: "paths.settings_dir".into(),
        })
    }

    pub fn labextensions_path(&self) -> Vec<PathBuf> {
        self.labextensions_path.iter().filter_map(|p| non_empty(p)).collect()
    }

    /// Every override document in application order: the deployment
    /// document first (JSON preferred over JSON5), then `override_files`.
    /// Paths are returned whether or not they exist; only the deployment
    /// document is optional.
    pub fn override_documents(&self) -> Vec<OverridePath> {
        let mut documents = Vec::new();
        if let Some(dir) = self.app_settings_dir() {
            let json = dir.join(OVERRIDES_FILE);
            let path = if json.exists() {
                json
            } else {
                dir.join(OVERRIDES_FILE_JSON5)
            };
            documents.push(OverridePath {
                path,
                required: false,
            });
        }
        documents.extend(
            self.override_files
                .iter()
                .filter_map(|p| non_empty(p))
                .map(|path| OverridePath {
                    path,
                    required: true,
                }),
        );
        documents
    }
}

fn non_empty(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

//! # knob-config
//!
//! Layered configuration loading for Knob using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`KNOB_*` prefix, `__` as separator)
//! 2. Project-level `.knob/config.toml`
//! 3. User-level `~/.config/knob/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `KNOB_PATHS__SCHEMAS_DIR` -> `paths.schemas_dir`,
//! `KNOB_OVERRIDES__UNKNOWN_KEYS` -> `overrides.unknown_keys`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use knob_config::KnobConfig;
//!
//! let config = KnobConfig::load_with_dotenv().expect("config");
//! if config.paths.is_configured() {
//!     println!("schemas: {}", config.paths.schemas_dir);
//! }
//! ```

mod error;
mod overrides;
mod paths;
mod store;

pub use error::ConfigError;
pub use overrides::{OverridesConfig, UnknownOverridePolicy};
pub use paths::{OVERRIDES_FILE, OVERRIDES_FILE_JSON5, OverridePath, PathsConfig};
pub use store::{StoreBackendKind, StoreConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KnobConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub overrides: OverridesConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl KnobConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` loading.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support from the current directory.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load with an explicit config file layered above the discovered ones
    /// and below the environment.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        Self::base_figment()
            .merge(Toml::file(path))
            .merge(Env::prefixed("KNOB_").split("__"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers.
    pub fn figment() -> Figment {
        Self::base_figment().merge(Env::prefixed("KNOB_").split("__"))
    }

    fn base_figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".knob/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("knob").join("config.toml"))
    }
}

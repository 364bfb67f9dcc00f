//! Override merge policy.

use serde::{Deserialize, Serialize};

/// What to do with an override key that names no schema property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownOverridePolicy {
    /// Skip the key and keep resolving.
    #[default]
    Ignore,
    /// Fail schema resolution for the plugin.
    Reject,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OverridesConfig {
    #[serde(default)]
    pub unknown_keys: UnknownOverridePolicy,
}

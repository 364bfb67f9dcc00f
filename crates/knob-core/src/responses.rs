//! Response types returned by the settings service.
//!
//! These structs define the JSON shape handed to the transport layer for
//! `GET settings/{id}` and `GET settings/`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::PluginId;

/// One plugin's settings as seen by a client.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SettingsRecord {
    /// Plugin id, `<package>:<plugin>`.
    #[schemars(with = "String")]
    pub id: PluginId,

    /// Composed JSON Schema (base schema plus deployment overrides).
    pub schema: Value,

    /// Version of the owning package, or `"N/A"`.
    pub version: String,

    /// User-authored JSON5 text exactly as stored.
    pub raw: String,

    /// `raw` parsed, with schema defaults filled in for absent keys.
    pub settings: Map<String, Value>,

    /// First successful write, `null` until then.
    pub created: Option<DateTime<Utc>>,

    /// Latest successful write, `null` until the first one.
    pub last_modified: Option<DateTime<Utc>>,
}

/// Response for `GET settings/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SettingsListing {
    pub settings: Vec<SettingsRecord>,
}

impl SettingsListing {
    /// Find the entry for `id`, if listed.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&SettingsRecord> {
        self.settings.iter().find(|record| record.id.as_str() == id)
    }
}

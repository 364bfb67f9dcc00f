//! Timestamped settings records on top of a [`StorageBackend`].

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use knob_core::{Clock, PluginId, SystemClock};
use serde::{Deserialize, Serialize};

use crate::backend::{MemoryBackend, StorageBackend};
use crate::error::StoreError;
use crate::lock::KeyedLocks;

/// Raw text reported for a plugin that has never been written.
pub const DEFAULT_RAW: &str = "{}";

const RECORD_VERSION: u32 = 1;

/// What the store knows about one plugin's user settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSettings {
    pub raw: String,
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl StoredSettings {
    /// The record of a never-written plugin.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            raw: DEFAULT_RAW.to_string(),
            created: None,
            last_modified: None,
        }
    }

    #[must_use]
    pub const fn is_written(&self) -> bool {
        self.last_modified.is_some()
    }
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self::empty()
    }
}

/// On-disk shape of one record.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedRecord {
    #[serde(default = "record_version")]
    v: u32,
    raw: String,
    created: DateTime<Utc>,
    last_modified: DateTime<Utc>,
}

const fn record_version() -> u32 {
    RECORD_VERSION
}

/// Per-plugin settings persistence.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct SettingsStore {
    backend: Arc<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    locks: KeyedLocks,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("locked_ids", &self.locks.len())
            .finish_non_exhaustive()
    }
}

impl SettingsStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self::from_shared(Arc::new(backend))
    }

    #[must_use]
    pub fn from_shared(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            clock: Arc::new(SystemClock),
            locks: KeyedLocks::new(),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current record for `id`; unwritten ids yield [`StoredSettings::empty`].
    ///
    /// # Errors
    ///
    /// `StoreError::Io` from the backend, `StoreError::Corrupt` if the stored
    /// bytes cannot be decoded.
    pub fn get(&self, id: &PluginId) -> Result<StoredSettings, StoreError> {
        let Some(bytes) = self.backend.read(id)? else {
            return Ok(StoredSettings::empty());
        };
        let record: PersistedRecord = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(%id, error = %e, "stored settings cannot be decoded");
            StoreError::Corrupt {
                id: id.to_string(),
                reason: e.to_string(),
            }
        })?;
        if record.v != RECORD_VERSION {
            tracing::error!(%id, version = record.v, "unsupported settings record version");
            return Err(StoreError::Corrupt {
                id: id.to_string(),
                reason: format!("unsupported record version {}", record.v),
            });
        }
        Ok(StoredSettings {
            raw: record.raw,
            created: Some(record.created),
            last_modified: Some(record.last_modified),
        })
    }

    /// Persist `raw` for `id` and return the new `last_modified`.
    ///
    /// `created` is fixed by the first write. `last_modified` is strictly
    /// greater than any value previously returned for the same id.
    ///
    /// # Errors
    ///
    /// Backend failures and undecodable previous records are propagated; on
    /// error nothing has been written.
    pub fn put(&self, id: &PluginId, raw: &str) -> Result<DateTime<Utc>, StoreError> {
        self.locks.with_lock(id, || {
            let previous = self.get(id)?;
            let now = self.clock.now().trunc_subsecs(6);
            let last_modified = match previous.last_modified {
                Some(prev) if now <= prev => prev + TimeDelta::microseconds(1),
                _ => now,
            };
            let created = previous.created.unwrap_or(last_modified);

            let record = PersistedRecord {
                v: RECORD_VERSION,
                raw: raw.to_string(),
                created,
                last_modified,
            };
            let bytes = serde_json::to_vec(&record).map_err(|e| StoreError::Encode {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
            self.backend.write(id, &bytes)?;

            tracing::info!(%id, %last_modified, bytes = raw.len(), "settings written");
            Ok(last_modified)
        })
    }

    /// Records for each of `ids`, in the order given.
    ///
    /// # Errors
    ///
    /// The first failing [`get`](Self::get).
    pub fn list<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a PluginId>,
    ) -> Result<Vec<(PluginId, StoredSettings)>, StoreError> {
        ids.into_iter()
            .map(|id| Ok((id.clone(), self.get(id)?)))
            .collect()
    }

    /// Ids with a persisted record, sorted.
    ///
    /// # Errors
    ///
    /// `StoreError::Io` if the backend cannot enumerate its keys.
    pub fn stored_ids(&self) -> Result<Vec<PluginId>, StoreError> {
        self.backend.keys()
    }
}

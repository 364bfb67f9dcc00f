use chrono::{DateTime, Utc};
use knob_config::{KnobConfig, StoreBackendKind};
use knob_core::{PluginId, SettingsListing, SettingsRecord};
use knob_schema::validator::{apply_defaults, validate_syntax, validate_write};
use knob_schema::{ComposedSchema, PluginRegistry, SchemaResolver};
use knob_store::{FsBackend, SettingsStore, StoredSettings};

use crate::error::ServiceError;

/// Where a plugin id stands with respect to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsState {
    /// Not in the registry. Reads and writes fail with `NotFound`.
    Unknown,
    /// Registered, never written. Reads report defaults.
    NoSettings,
    /// Registered and written at least once.
    HasSettings,
}

/// Read, list, and write plugin settings.
///
/// The registry is fixed at construction; a plugin that is not registered
/// cannot be written.
#[derive(Debug)]
pub struct SettingsService {
    resolver: SchemaResolver,
    store: SettingsStore,
}

impl SettingsService {
    #[must_use]
    pub const fn new(resolver: SchemaResolver, store: SettingsStore) -> Self {
        Self { resolver, store }
    }

    /// Load the registry and open the configured store.
    ///
    /// # Errors
    ///
    /// `ServiceError::Schema` if schemas or overrides fail to load,
    /// `ServiceError::Config` if the fs store has no settings dir, and
    /// `ServiceError::StoreIo` if that dir cannot be created.
    pub fn from_config(config: &KnobConfig) -> Result<Self, ServiceError> {
        let registry = PluginRegistry::load(&config.paths)?;
        let plugins = registry.len();
        let resolver = SchemaResolver::new(registry).with_policy(config.overrides.unknown_keys);

        let store = match config.store.backend {
            StoreBackendKind::Fs => {
                let root = config.paths.require_settings_dir()?;
                SettingsStore::new(FsBackend::new(root)?)
            }
            StoreBackendKind::Memory => SettingsStore::in_memory(),
        };

        tracing::info!(plugins, backend = ?config.store.backend, "settings service ready");
        Ok(Self::new(resolver, store))
    }

    #[must_use]
    pub const fn registry(&self) -> &PluginRegistry {
        self.resolver.registry()
    }

    #[must_use]
    pub const fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Settings, composed schema, and version for one plugin.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids; `StoreCorruption` if the stored raw text
    /// no longer parses; schema and store failures otherwise.
    pub fn get(&self, id: &str) -> Result<SettingsRecord, ServiceError> {
        let id = self.known_id(id)?;
        let stored = self.store.get(&id)?;
        self.record(id, stored)
    }

    /// Every registered plugin, written or not.
    ///
    /// # Errors
    ///
    /// The first failure encountered for any plugin.
    pub fn list(&self) -> Result<SettingsListing, ServiceError> {
        let ids: Vec<&PluginId> = self.registry().ids().collect();
        let settings = self
            .store
            .list(ids)?
            .into_iter()
            .map(|(id, stored)| self.record(id, stored))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = settings.len(), "listed settings");
        Ok(SettingsListing { settings })
    }

    /// Validate a `{"raw": ...}` body and persist it.
    ///
    /// Returns the new `last_modified`. Nothing is written unless every
    /// check passes.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Envelope`/`Syntax`/`SchemaValidation`
    /// for rejected bodies, schema and store failures otherwise.
    pub fn put(&self, id: &str, body: &[u8]) -> Result<DateTime<Utc>, ServiceError> {
        let id = self.known_id(id)?;
        let (schema, _) = self.resolver.resolve(&id)?;
        let raw = validate_write(body, &schema).inspect_err(|error| {
            tracing::debug!(%id, %error, "rejected settings write");
        })?;
        Ok(self.store.put(&id, &raw)?)
    }

    /// Lifecycle state of `id`.
    ///
    /// # Errors
    ///
    /// Store failures while checking for a persisted record.
    pub fn state(&self, id: &str) -> Result<SettingsState, ServiceError> {
        let Some(id) = self.registry().find(id) else {
            return Ok(SettingsState::Unknown);
        };
        if self.store.get(id)?.is_written() {
            Ok(SettingsState::HasSettings)
        } else {
            Ok(SettingsState::NoSettings)
        }
    }

    fn known_id(&self, raw: &str) -> Result<PluginId, ServiceError> {
        self.registry()
            .find(raw)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(raw.to_string()))
    }

    fn record(&self, id: PluginId, stored: StoredSettings) -> Result<SettingsRecord, ServiceError> {
        let (schema, version) = self.resolver.resolve(&id)?;
        let settings = parse_stored(&id, &stored.raw, &schema)?;
        Ok(SettingsRecord {
            id,
            schema: schema.into_document(),
            version,
            raw: stored.raw,
            settings,
            created: stored.created,
            last_modified: stored.last_modified,
        })
    }
}

fn parse_stored(
    id: &PluginId,
    raw: &str,
    schema: &ComposedSchema,
) -> Result<serde_json::Map<String, serde_json::Value>, ServiceError> {
    let parsed = validate_syntax(raw).map_err(|error| {
        tracing::error!(%id, %error, "stored settings no longer parse");
        ServiceError::StoreCorruption {
            id: id.to_string(),
            reason: error.to_string(),
        }
    })?;
    Ok(apply_defaults(parsed, schema))
}

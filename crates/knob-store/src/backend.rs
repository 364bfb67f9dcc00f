//! Raw byte storage keyed by plugin id.

use std::collections::HashMap;

use knob_core::PluginId;
use parking_lot::RwLock;

use crate::error::StoreError;

/// Byte-level persistence contract used by [`SettingsStore`](crate::SettingsStore).
///
/// `write` must be atomic: a concurrent or later `read` sees either the old
/// bytes or the new bytes, never a mix.
pub trait StorageBackend: Send + Sync {
    /// Bytes stored under `id`, or `None` if never written.
    fn read(&self, id: &PluginId) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the bytes stored under `id`.
    fn write(&self, id: &PluginId, bytes: &[u8]) -> Result<(), StoreError>;

    /// Every id with stored bytes.
    fn keys(&self) -> Result<Vec<PluginId>, StoreError>;

    fn exists(&self, id: &PluginId) -> Result<bool, StoreError> {
        Ok(self.read(id)?.is_some())
    }
}

/// Process-local backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<PluginId, Vec<u8>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, id: &PluginId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.read().get(id).cloned())
    }

    fn write(&self, id: &PluginId, bytes: &[u8]) -> Result<(), StoreError> {
        self.entries.write().insert(id.clone(), bytes.to_vec());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<PluginId>, StoreError> {
        let mut keys: Vec<PluginId> = self.entries.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn exists(&self, id: &PluginId) -> Result<bool, StoreError> {
        Ok(self.entries.read().contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_roundtrip() {
        let backend = MemoryBackend::new();
        let id = PluginId::parse("pkg:plugin").unwrap();
        assert_eq!(backend.read(&id).unwrap(), None);
        assert!(!backend.exists(&id).unwrap());

        backend.write(&id, b"hello").unwrap();
        assert_eq!(backend.read(&id).unwrap(), Some(b"hello".to_vec()));
        assert!(backend.exists(&id).unwrap());
        assert_eq!(backend.keys().unwrap(), vec![id]);
    }
}

//! Per-id mutual exclusion.

use std::sync::Arc;

use dashmap::DashMap;
use knob_core::PluginId;
use parking_lot::Mutex;

/// One mutex per plugin id, created on first use.
///
/// Holding the lock for one id never blocks work on another id.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: DashMap<PluginId, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `id`.
    pub fn with_lock<T>(&self, id: &PluginId, f: impl FnOnce() -> T) -> T {
        // Clone the Arc out so the map shard is released before blocking.
        let lock = self
            .locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock();
        f()
    }

    /// Number of ids that have been locked at least once.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

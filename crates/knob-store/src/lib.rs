//! # knob-store
//!
//! Settings persistence for Knob.
//!
//! `SettingsStore` keeps each plugin's raw JSON5 text together with its
//! `created` / `last_modified` timestamps. Writes to the same plugin id are
//! serialized through a keyed lock so timestamp assignment is linearizable;
//! writes to different ids run in parallel. Reads take no lock.
//!
//! Raw byte I/O is delegated to a [`StorageBackend`]. Two backends ship:
//! [`MemoryBackend`] and [`FsBackend`] (atomic temp-file + rename).

pub mod backend;
pub mod error;
mod fs;
mod lock;
mod store;

pub use backend::{MemoryBackend, StorageBackend};
pub use error::StoreError;
pub use fs::FsBackend;
pub use lock::KeyedLocks;
pub use store::{DEFAULT_RAW, SettingsStore, StoredSettings};

//! # knob-service
//!
//! The settings service: one object that answers `get`, `list`, and `put`
//! for plugin settings.
//!
//! A read resolves the plugin's composed schema and package version, loads
//! the stored raw text and timestamps, and fills schema defaults into the
//! parsed settings. A write runs the validator chain against the current
//! composed schema and only then reaches the store.
//!
//! Errors carry an HTTP status via [`ServiceError::status_code`] so any
//! transport can map them without knowing the crates underneath.

pub mod error;
mod service;

pub use error::ServiceError;
pub use service::{SettingsService, SettingsState};

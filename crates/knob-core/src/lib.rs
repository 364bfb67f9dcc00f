//! # knob-core
//!
//! Core types shared by every Knob crate.
//!
//! This crate provides:
//! - `PluginId`: the validated `<package>:<plugin>` key used everywhere
//! - Response shapes for single records and listings (with JSON Schemas)
//! - The `Clock` seam used for server-side timestamps
//! - Cross-cutting error types

pub mod clock;
pub mod errors;
pub mod ids;
pub mod responses;

pub use clock::{Clock, SystemClock};
pub use errors::IdError;
pub use ids::PluginId;
pub use responses::{SettingsListing, SettingsRecord};

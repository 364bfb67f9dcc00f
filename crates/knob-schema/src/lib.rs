//! # knob-schema
//!
//! Plugin registry, schema composition, and settings validation for Knob.
//!
//! This crate provides:
//! - `PluginRegistry`: the load-once catalog of plugin schemas, package
//!   versions, and deployment override documents
//! - `SchemaResolver`: merges override fragments into a plugin's base schema
//!   and reports the owning package version
//! - `validator`: the write gate (envelope -> JSON5 syntax -> schema)
//!
//! ## Architecture
//!
//! The registry is built once at startup (from disk via
//! [`PluginRegistry::load`] or in-process via [`PluginRegistry::builder`]) and
//! handed to the resolver by value. Nothing here performs settings I/O; the
//! store lives in `knob-store`.

mod composed;
pub mod error;
mod loader;
pub mod merge;
pub mod registry;
pub mod resolver;
pub mod validator;

pub use composed::ComposedSchema;
pub use error::{SchemaError, ValidationError};
pub use registry::{
    OverrideDocument, OverrideFragment, OverrideScope, PluginRegistry, PluginSource,
    RegistryBuilder,
};
pub use resolver::SchemaResolver;

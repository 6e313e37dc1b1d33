//! Configuration models and file loading for the troupe harness.
//!
//! This crate owns the config schema, defaults, and the json5 file loader
//! used by demo binaries and embedders of the SDK.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Config file loader.
pub use loader::load_config;
/// Configuration schema models.
pub use model::*;

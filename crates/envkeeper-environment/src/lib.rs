//! # envkeeper-environment
//!
//! Binds the descriptor, the platform lifecycle and the plugin lifecycle
//! into one environment:
//! - `status()` assesses drift without touching anything
//! - `update()` converges the platform and plugins, honouring dry-run
//! - `clean()` removes exactly what the last install put down
//! - plugin entry edits, persisted with `save()`

pub mod environment;
pub mod error;
pub mod report;

pub use environment::{
    Environment, PlatformUpdate, PluginChange, PluginOutcome, RemovePluginOptions, UpdateOptions,
    UpdateOutcome,
};
pub use error::{Error, Result};
pub use report::StatusReport;

//! # envkeeper-core
//!
//! Core library for envkeeper providing:
//! - Environment descriptor parsing and validation (environment.json)
//! - Runtime configuration with hierarchical precedence
//! - Status report types shared by the platform and plugin checks
//! - Content hashing used by the installation manifest

pub mod config;
pub mod error;
pub mod hashing;
pub mod types;

pub use config::{DescriptorFile, HierarchicalConfigLoader};
pub use error::{Error, Result};

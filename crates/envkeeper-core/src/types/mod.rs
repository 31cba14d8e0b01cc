//! Type definitions for envkeeper

mod descriptor_types;
mod runtime_config;
mod status_types;

pub use descriptor_types::*;
pub use runtime_config::*;
pub use status_types::*;

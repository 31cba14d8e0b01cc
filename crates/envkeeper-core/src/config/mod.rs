//! Configuration loading: the environment descriptor and runtime settings

mod hierarchical_loader;
mod loader;

pub use hierarchical_loader::{HierarchicalConfigLoader, CONFIG_FILE_NAME};
pub use loader::{validate, DescriptorFile, DESCRIPTOR_FILE_NAME};

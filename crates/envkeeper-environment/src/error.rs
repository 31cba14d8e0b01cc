//! Error types for envkeeper-environment

use thiserror::Error;

/// Result type alias using envkeeper-environment's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Orchestration error types
#[derive(Error, Debug)]
pub enum Error {
    /// Descriptor or runtime configuration error
    #[error(transparent)]
    Core(#[from] envkeeper_core::Error),

    /// Platform download, install, drift or removal error
    #[error(transparent)]
    Platform(#[from] envkeeper_platform::Error),

    /// Plugin working copy error
    #[error(transparent)]
    Plugin(#[from] envkeeper_plugins::Error),
}

impl Error {
    /// Whether the error stems from configuration rather than the environment
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Core(e) if e.is_configuration())
    }
}

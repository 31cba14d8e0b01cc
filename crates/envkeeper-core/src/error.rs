//! Error types for envkeeper-core

use thiserror::Error;

/// Result type alias using envkeeper-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for envkeeper
#[derive(Error, Debug)]
pub enum Error {
    /// Descriptor file not found
    #[error("Environment descriptor not found: {path}")]
    DescriptorNotFound { path: String },

    /// Descriptor already exists (init without --force)
    #[error("Environment descriptor already exists: {path}")]
    DescriptorExists { path: String },

    /// Invalid configuration (descriptor or runtime config)
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Invalid plugin entry in the descriptor
    #[error("Invalid plugin entry #{index}: {message}")]
    InvalidPlugin { index: usize, message: String },

    /// Plugin path is not declared in the descriptor
    #[error("Plugin not found in descriptor: {path}")]
    PluginNotFound { path: String },

    /// Plugin path is already declared in the descriptor
    #[error("Plugin already declared in descriptor: {path}")]
    PluginExists { path: String },

    /// Invalid semver version
    #[error("Invalid platform version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a descriptor not found error
    pub fn descriptor_not_found(path: impl Into<String>) -> Self {
        Self::DescriptorNotFound { path: path.into() }
    }

    /// Create a descriptor exists error
    pub fn descriptor_exists(path: impl Into<String>) -> Self {
        Self::DescriptorExists { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid plugin entry error
    pub fn invalid_plugin(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidPlugin {
            index,
            message: message.into(),
        }
    }

    /// Create a plugin not found error
    pub fn plugin_not_found(path: impl Into<String>) -> Self {
        Self::PluginNotFound { path: path.into() }
    }

    /// Create a plugin exists error
    pub fn plugin_exists(path: impl Into<String>) -> Self {
        Self::PluginExists { path: path.into() }
    }

    /// Create an invalid version error
    pub fn invalid_version(version: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a configuration defect (as opposed to I/O)
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

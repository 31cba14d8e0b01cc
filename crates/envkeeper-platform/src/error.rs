//! Error types for envkeeper-platform

use thiserror::Error;

/// Result type alias using envkeeper-platform's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Platform lifecycle error types
#[derive(Error, Debug)]
pub enum Error {
    /// The archive for the requested version does not exist (HTTP 404)
    #[error("Platform version not found: {url} returned 404 Not Found")]
    VersionNotFound { url: String },

    /// The server answered with a non-success status
    #[error("Download failed: {url} returned {status}")]
    DownloadFailed { url: String, status: u16 },

    /// The transfer broke off or could not be started
    #[error("Transfer of {url} failed: {source}")]
    Transfer {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The body ended before the announced content length
    #[error("Transfer of {url} was truncated: received {received} of {expected} bytes")]
    Truncated {
        url: String,
        expected: u64,
        received: u64,
    },

    /// The downloaded bytes are not a well-formed archive
    #[error("Invalid archive: {message}")]
    InvalidArchive { message: String },

    /// The installation manifest exists but cannot be read
    #[error("Corrupt installation manifest {path}: {source}")]
    CorruptManifest {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The root handed to an operation is unusable
    #[error("Invalid platform root {path}: {message}")]
    InvalidRoot { path: String, message: String },

    /// The platform executable could not be queried for its version
    #[error("Failed to query platform version from {path}: {message}")]
    VersionProbe { path: String, message: String },

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] envkeeper_core::Error),
}

impl Error {
    /// Create a version not found error
    pub fn version_not_found(url: impl Into<String>) -> Self {
        Self::VersionNotFound { url: url.into() }
    }

    /// Create a download failed error
    pub fn download_failed(url: impl Into<String>, status: u16) -> Self {
        Self::DownloadFailed {
            url: url.into(),
            status,
        }
    }

    /// Create a transfer error
    pub fn transfer(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transfer {
            url: url.into(),
            source,
        }
    }

    /// Create an invalid archive error
    pub fn invalid_archive(message: impl Into<String>) -> Self {
        Self::InvalidArchive {
            message: message.into(),
        }
    }

    /// Create an invalid root error
    pub fn invalid_root(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a version probe error
    pub fn version_probe(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::VersionProbe {
            path: path.into(),
            message: message.into(),
        }
    }
}

//! Error types for envkeeper-plugins

use thiserror::Error;

/// Result type alias using envkeeper-plugins's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Plugin lifecycle error types
#[derive(Error, Debug)]
pub enum Error {
    /// Git operation failed
    #[error("Git operation failed: {message}")]
    GitOperation { message: String },

    /// Git command not found
    #[error("Git command not found. Please ensure git is installed and in PATH")]
    GitNotFound,

    /// Clone failed
    #[error("Failed to clone repository: {message}")]
    CloneFailed { message: String },

    /// Destination of a clone already exists
    #[error("Repository already exists at: {path}")]
    RepoExists { path: String },

    /// Directory exists but is not the top of a git working copy
    #[error("Not a git repository: {path}")]
    NotARepository { path: String },

    /// Plugin has no remote to clone from
    #[error("Plugin '{path}' has no url to clone from")]
    MissingUrl { path: String },

    /// Working copy has uncommitted changes blocking a destructive operation
    #[error("Plugin '{path}' has uncommitted changes")]
    DirtyWorkingCopy { path: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] envkeeper_core::Error),
}

impl Error {
    /// Create a git operation error
    pub fn git_operation(message: impl Into<String>) -> Self {
        Self::GitOperation {
            message: message.into(),
        }
    }

    /// Create a clone failed error
    pub fn clone_failed(message: impl Into<String>) -> Self {
        Self::CloneFailed {
            message: message.into(),
        }
    }

    /// Create a repository exists error
    pub fn repo_exists(path: impl Into<String>) -> Self {
        Self::RepoExists { path: path.into() }
    }

    /// Create a not a repository error
    pub fn not_a_repository(path: impl Into<String>) -> Self {
        Self::NotARepository { path: path.into() }
    }

    /// Create a missing url error
    pub fn missing_url(path: impl Into<String>) -> Self {
        Self::MissingUrl { path: path.into() }
    }

    /// Create a dirty working copy error
    pub fn dirty_working_copy(path: impl Into<String>) -> Self {
        Self::DirtyWorkingCopy { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::not_a_repository("/env/plugins/blog").to_string(),
            "Not a git repository: /env/plugins/blog"
        );
        assert_eq!(
            Error::dirty_working_copy("plugins/blog").to_string(),
            "Plugin 'plugins/blog' has uncommitted changes"
        );
    }
}

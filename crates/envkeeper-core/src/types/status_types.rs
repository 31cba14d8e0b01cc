//! Status report items
//!
//! A status item is either about the platform or about one plugin. The
//! up-to-date flag, message and file list are only settable through the
//! constructors below, so an item that says "is OK." never carries drift.

use super::descriptor_types::PluginEntry;
use serde::Serialize;
use std::fmt;

/// Canonical message of an item without drift
pub const OK_MESSAGE: &str = "is OK.";

/// How a manifest-listed file diverges from its recorded digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileDrift {
    /// Listed in the manifest but gone from disk
    Missing,
    /// Present but with different content
    Modified,
}

impl fmt::Display for FileDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileDrift::Missing => write!(f, "missing"),
            FileDrift::Modified => write!(f, "modified"),
        }
    }
}

/// One drifted file below the platform root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    /// Slash-separated path relative to the platform root
    pub path: String,

    /// Kind of drift
    pub drift: FileDrift,
}

impl FileStatus {
    /// Create a file status entry
    pub fn new(path: impl Into<String>, drift: FileDrift) -> Self {
        Self {
            path: path.into(),
            drift,
        }
    }
}

/// Status of the platform installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformStatus {
    up_to_date: bool,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    files: Vec<FileStatus>,
}

impl PlatformStatus {
    /// Platform matches the descriptor
    pub fn ok() -> Self {
        Self {
            up_to_date: true,
            message: OK_MESSAGE.to_string(),
            files: Vec::new(),
        }
    }

    /// Platform diverges for a reason other than file content
    pub fn drift(message: impl Into<String>) -> Self {
        Self {
            up_to_date: false,
            message: message.into(),
            files: Vec::new(),
        }
    }

    /// Manifest-listed files are missing or changed
    pub fn modified(files: Vec<FileStatus>) -> Self {
        debug_assert!(!files.is_empty(), "modified status without files");
        Self {
            up_to_date: false,
            message: "has been modified since installation.".to_string(),
            files,
        }
    }

    /// Whether the platform matches the descriptor
    pub fn is_up_to_date(&self) -> bool {
        self.up_to_date
    }

    /// Human-readable message, to be prefixed with the subject
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Drifted files (empty unless modified)
    pub fn files(&self) -> &[FileStatus] {
        &self.files
    }
}

/// Status of one plugin working copy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginStatus {
    up_to_date: bool,
    message: String,
    entry: PluginEntry,
}

impl PluginStatus {
    /// Plugin matches the descriptor
    pub fn ok(entry: PluginEntry) -> Self {
        Self {
            up_to_date: true,
            message: OK_MESSAGE.to_string(),
            entry,
        }
    }

    /// Plugin diverges from the descriptor
    pub fn drift(entry: PluginEntry, message: impl Into<String>) -> Self {
        Self {
            up_to_date: false,
            message: message.into(),
            entry,
        }
    }

    /// Whether the plugin matches the descriptor
    pub fn is_up_to_date(&self) -> bool {
        self.up_to_date
    }

    /// Human-readable message, to be prefixed with the subject
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The descriptor entry this status was computed for
    pub fn entry(&self) -> &PluginEntry {
        &self.entry
    }
}

/// A single line of a status report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StatusItem {
    Platform(PlatformStatus),
    Plugin(PluginStatus),
}

impl StatusItem {
    /// Whether this item shows no drift
    pub fn is_up_to_date(&self) -> bool {
        match self {
            StatusItem::Platform(status) => status.is_up_to_date(),
            StatusItem::Plugin(status) => status.is_up_to_date(),
        }
    }

    /// Message fragment
    pub fn message(&self) -> &str {
        match self {
            StatusItem::Platform(status) => status.message(),
            StatusItem::Plugin(status) => status.message(),
        }
    }

    /// What the message is about, e.g. "Platform" or "Plugin 'plugins/blog'"
    pub fn subject(&self) -> String {
        match self {
            StatusItem::Platform(_) => "Platform".to_string(),
            StatusItem::Plugin(status) => format!("Plugin '{}'", status.entry().path),
        }
    }
}

impl fmt::Display for StatusItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.subject(), self.message())
    }
}

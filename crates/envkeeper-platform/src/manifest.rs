//! Installation manifest
//!
//! The manifest records the content digest of every file extracted from a
//! platform archive. It lives inside the installed root:
//!
//! ```json
//! {
//!   "files": {
//!     "bin/platform": "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
//!     "config/default.json": "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
//!   }
//! }
//! ```
//!
//! It is written last, through a temporary file that is renamed into place,
//! so a tree without a manifest was never completely installed.

use crate::error::{Error, Result};
use envkeeper_core::hashing;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Name of the manifest file inside the installed root
pub const MANIFEST_FILENAME: &str = ".envkeeper-manifest.json";

/// Ledger of installed files and their digests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationManifest {
    /// Slash-normalized relative path -> hex digest
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

impl InstallationManifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manifest from `(path, stream)` pairs, consuming each stream once
    pub fn build<I, P, R>(entries: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = (P, R)>,
        P: AsRef<str>,
        R: Read,
    {
        let mut manifest = Self::new();
        for (path, reader) in entries {
            manifest.record(path.as_ref(), reader)?;
        }
        Ok(manifest)
    }

    /// Digest a stream and record it under `path`
    ///
    /// Directory markers are ignored. Returns whether an entry was recorded.
    pub fn record<R: Read>(&mut self, path: &str, reader: R) -> io::Result<bool> {
        let Some(normalized) = normalize_entry_path(path) else {
            return Ok(false);
        };
        let digest = hashing::digest_reader(reader)?;
        self.files.insert(normalized, digest);
        Ok(true)
    }

    /// Record an already computed digest
    pub fn insert_digest(&mut self, path: &str, digest: impl Into<String>) -> bool {
        match normalize_entry_path(path) {
            Some(normalized) => {
                self.files.insert(normalized, digest.into());
                true
            }
            None => false,
        }
    }

    /// Recorded digest for a path
    pub fn digest(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Number of recorded files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files are recorded
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate `(path, digest)` pairs in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, d)| (p.as_str(), d.as_str()))
    }

    /// Location of the manifest inside `root`
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(MANIFEST_FILENAME)
    }

    /// Atomically write the manifest into `root`
    pub fn save(&self, root: &Path) -> Result<PathBuf> {
        let path = Self::path_in(root);
        let content = serde_json::to_string_pretty(self)?;

        let mut temp = NamedTempFile::new_in(root)?;
        temp.write_all(content.as_bytes())?;
        temp.write_all(b"\n")?;
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        debug!("Saved manifest with {} files to {:?}", self.len(), path);
        Ok(path)
    }

    /// Load the manifest from `root`
    ///
    /// `None` means no manifest exists: never installed, or installed by a
    /// tool that did not write one.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = Self::path_in(root);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let manifest: Self =
            serde_json::from_str(&content).map_err(|source| Error::CorruptManifest {
                path: path.display().to_string(),
                source,
            })?;
        debug!("Loaded manifest with {} files", manifest.len());
        Ok(Some(manifest))
    }

    /// Delete the manifest from `root`, returning whether it existed
    pub fn delete(root: &Path) -> Result<bool> {
        match fs::remove_file(Self::path_in(root)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Normalize an archive entry path to forward slashes
///
/// Returns `None` for directory markers (trailing separator) and empty paths.
pub fn normalize_entry_path(path: &str) -> Option<String> {
    if path.is_empty() || path.ends_with('/') || path.ends_with('\\') {
        return None;
    }

    let normalized = path.replace('\\', "/");
    let normalized = normalized.trim_start_matches("./");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}

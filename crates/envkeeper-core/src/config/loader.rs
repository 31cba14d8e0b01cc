//! Environment descriptor loading, validation and persistence

use crate::error::{Error, Result};
use crate::types::{normalize_plugin_path, EnvironmentDescriptor, RequestedVersion};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs;
use tracing::debug;

/// Descriptor file name searched for in the environment root
pub const DESCRIPTOR_FILE_NAME: &str = "environment.json";

/// A loaded and validated descriptor together with its location
#[derive(Debug, Clone)]
pub struct DescriptorFile {
    /// The parsed descriptor
    pub descriptor: EnvironmentDescriptor,

    /// Path to the descriptor file
    pub path: Utf8PathBuf,

    /// Environment root (directory containing the descriptor)
    pub root: Utf8PathBuf,
}

impl DescriptorFile {
    /// Load the descriptor from an environment directory, or search the
    /// current directory and its parents when none is given
    pub fn load(dir: Option<&Utf8Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::load_file(&dir.join(DESCRIPTOR_FILE_NAME)),
            None => {
                let cwd = std::env::current_dir()?;
                let cwd = Utf8PathBuf::try_from(cwd).map_err(|_| {
                    Error::invalid_config("Current directory path is not valid UTF-8")
                })?;
                Self::find(&cwd)
            }
        }
    }

    /// Load a specific descriptor file
    pub fn load_file(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::descriptor_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        let descriptor = Self::parse(&content)
            .map_err(|e| match e {
                Error::JsonParse(json) => Error::invalid_config(format!("{}: {}", path, json)),
                other => other,
            })?;

        debug!(
            "Loaded descriptor {} with {} plugins",
            path,
            descriptor.plugins.len()
        );

        let root = path
            .parent()
            .map(|p| p.to_owned())
            .unwrap_or_else(|| Utf8PathBuf::from("."));

        Ok(Self {
            descriptor,
            path: path.to_owned(),
            root,
        })
    }

    /// Search `start` and its parents for a descriptor
    pub fn find(start: &Utf8Path) -> Result<Self> {
        let mut current = start;

        loop {
            let candidate = current.join(DESCRIPTOR_FILE_NAME);
            if candidate.exists() {
                return Self::load_file(&candidate);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err(Error::descriptor_not_found(format!(
            "{} (searched {} and parent directories)",
            DESCRIPTOR_FILE_NAME, start
        )))
    }

    /// Parse and validate descriptor text
    pub fn parse(content: &str) -> Result<EnvironmentDescriptor> {
        let descriptor: EnvironmentDescriptor = serde_json::from_str(content)?;
        validate(&descriptor)?;
        Ok(descriptor)
    }

    /// Write a new descriptor into `dir`
    pub fn create(dir: &Utf8Path, descriptor: EnvironmentDescriptor, force: bool) -> Result<Self> {
        validate(&descriptor)?;

        let path = dir.join(DESCRIPTOR_FILE_NAME);
        if path.exists() && !force {
            return Err(Error::descriptor_exists(path.as_str()));
        }

        fs::create_dir_all(dir)?;
        let file = Self {
            descriptor,
            path,
            root: dir.to_owned(),
        };
        file.save()?;
        Ok(file)
    }

    /// Validate and write the descriptor back to its file
    pub fn save(&self) -> Result<()> {
        validate(&self.descriptor)?;

        let mut content = serde_json::to_string_pretty(&self.descriptor)?;
        content.push('\n');

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.path)?;

        debug!("Saved descriptor {}", self.path);
        Ok(())
    }
}

/// Check the structural invariants of a descriptor
///
/// Any defect rejects the whole descriptor; nothing is silently dropped.
pub fn validate(descriptor: &EnvironmentDescriptor) -> Result<()> {
    if let RequestedVersion::Invalid { raw, reason } = descriptor.requested_version() {
        return Err(Error::invalid_version(raw, reason));
    }

    let mut seen = HashSet::new();
    for (index, plugin) in descriptor.plugins.iter().enumerate() {
        let path = normalize_plugin_path(&plugin.path);

        if path.trim().is_empty() {
            return Err(Error::invalid_plugin(index, "path is empty"));
        }
        if is_absolute(&path) {
            return Err(Error::invalid_plugin(
                index,
                format!("path '{}' must be relative", plugin.path),
            ));
        }
        if path.split('/').any(|segment| segment == "..") {
            return Err(Error::invalid_plugin(
                index,
                format!("path '{}' must not leave the environment root", plugin.path),
            ));
        }
        if !seen.insert(path.clone()) {
            return Err(Error::invalid_plugin(
                index,
                format!("path '{}' is declared more than once", plugin.path),
            ));
        }
    }

    Ok(())
}

fn is_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/') || (bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic())
}

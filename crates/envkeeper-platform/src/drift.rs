//! Platform drift detection
//!
//! Compares what the descriptor requests with what is on disk. The checks
//! run in a fixed order and the first finding wins:
//!
//! 1. manual lifecycle (no version, empty, or "custom") -> OK
//! 2. unparsable version -> invalid version
//! 3. manifest present with missing/changed files -> modified
//! 4. no platform executable -> not installed
//! 5. executable without manifest -> not installed correctly
//! 6. installed version vs requested -> version mismatch
//! 7. OK
//!
//! Drift is always a status, never an error. Errors are reserved for I/O
//! failures that prevent the assessment itself.

use crate::error::Result;
use crate::manifest::InstallationManifest;
use crate::probe::{CommandVersionProbe, VersionProbe};
use envkeeper_core::hashing;
use envkeeper_core::types::{
    FileDrift, FileStatus, LayoutConfig, PlatformStatus, RequestedVersion,
};
use semver::Version;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// First major version compared on major.minor only
pub const RELAXED_VERSION_MAJOR: u64 = 2;

/// Detects drift between a requested platform version and an installed root
pub struct DriftDetector {
    layout: LayoutConfig,
    probe: Box<dyn VersionProbe>,
}

impl DriftDetector {
    /// Create a detector that probes the executable with the configured flag
    pub fn new(layout: &LayoutConfig) -> Self {
        Self::with_probe(
            layout,
            Box::new(CommandVersionProbe::new(layout.version_flag.clone())),
        )
    }

    /// Create a detector with a custom version probe
    pub fn with_probe(layout: &LayoutConfig, probe: Box<dyn VersionProbe>) -> Self {
        Self {
            layout: layout.clone(),
            probe,
        }
    }

    /// Location of the platform executable inside `root`
    pub fn binary_path(&self, root: &Path) -> PathBuf {
        root.join(self.layout.binary_file_name())
    }

    /// Assess the platform installed at `root` against `requested`
    pub async fn platform_status(
        &self,
        requested: &RequestedVersion,
        root: &Path,
    ) -> Result<PlatformStatus> {
        let expected = match requested {
            RequestedVersion::Manual => {
                debug!("Platform version is managed manually; skipping checks");
                return Ok(PlatformStatus::ok());
            }
            RequestedVersion::Invalid { raw, reason } => {
                debug!("Invalid platform version '{}': {}", raw, reason);
                return Ok(PlatformStatus::drift(format!(
                    "has an invalid version '{}' configured.",
                    raw
                )));
            }
            RequestedVersion::Pinned(version) => version,
        };

        let manifest = InstallationManifest::load(root)?;
        if let Some(manifest) = &manifest {
            let files = modified_files(root, manifest)?;
            if !files.is_empty() {
                return Ok(PlatformStatus::modified(files));
            }
        }

        let binary = self.binary_path(root);
        if !binary.is_file() {
            return Ok(PlatformStatus::drift("is not installed."));
        }

        if manifest.is_none() {
            return Ok(PlatformStatus::drift("was not installed correctly."));
        }

        let installed = match self.probe.installed_version(&binary).await {
            Ok(version) => version,
            Err(e) => {
                warn!("{}", e);
                None
            }
        };

        match installed {
            None => Ok(PlatformStatus::drift("reports no readable version.")),
            Some(installed) if !versions_match(expected, &installed) => {
                Ok(PlatformStatus::drift(format!(
                    "is version {} but should be {}.",
                    installed, expected
                )))
            }
            Some(_) => Ok(PlatformStatus::ok()),
        }
    }
}

/// Whether an installed version satisfies the requested one
///
/// Below [`RELAXED_VERSION_MAJOR`] the full major.minor.patch must agree;
/// from it on, patch releases are interchangeable.
pub fn versions_match(requested: &Version, installed: &Version) -> bool {
    if requested.major < RELAXED_VERSION_MAJOR {
        requested.major == installed.major
            && requested.minor == installed.minor
            && requested.patch == installed.patch
    } else {
        requested.major == installed.major && requested.minor == installed.minor
    }
}

/// Manifest-listed files that are gone or whose content changed
pub fn modified_files(root: &Path, manifest: &InstallationManifest) -> Result<Vec<FileStatus>> {
    let mut files = Vec::new();

    for (relative, recorded) in manifest.iter() {
        let path = root.join(relative);
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} is missing", relative);
                files.push(FileStatus::new(relative, FileDrift::Missing));
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if !metadata.is_file() || hashing::digest_file(&path)? != recorded {
            debug!("{} has been modified", relative);
            files.push(FileStatus::new(relative, FileDrift::Modified));
        }
    }

    Ok(files)
}

//! # envkeeper-platform
//!
//! Lifecycle of the pinned platform distribution inside an environment:
//! - Streaming archive download with progress reporting
//! - Archive extraction recorded in an installation manifest
//! - Drift detection against the manifest and the installed version
//! - Preserve-aware forceful removal and manifest-driven clean removal

pub mod download;
pub mod drift;
pub mod error;
pub mod installer;
pub mod manifest;
pub mod probe;
pub mod remover;

pub use download::{ArchiveDownloader, DownloadProgress};
pub use drift::{versions_match, DriftDetector, RELAXED_VERSION_MAJOR};
pub use error::{Error, Result};
pub use installer::{extract_archive, ArchiveFormat, ArchiveInstaller};
pub use manifest::{InstallationManifest, MANIFEST_FILENAME};
pub use probe::{CommandVersionProbe, VersionProbe};
pub use remover::{
    remove_installed, remove_tree, PreserveList, RemovalAction, RemovalRecord, RemovalReport,
};

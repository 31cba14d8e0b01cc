//! Archive installer
//!
//! Downloads a versioned platform archive, extracts it into the platform
//! root and records every extracted file in the installation manifest.
//! Distributions ship as zip archives; gzip-compressed tar archives are
//! accepted as well.
//!
//! # Example
//!
//! ```no_run
//! use envkeeper_core::types::RuntimeConfig;
//! use envkeeper_platform::ArchiveInstaller;
//! use semver::Version;
//! use std::path::Path;
//!
//! # async fn example() -> envkeeper_platform::Result<()> {
//! let installer = ArchiveInstaller::new(&RuntimeConfig::default())?;
//! let manifest = installer
//!     .install(&Version::new(2, 1, 0), Path::new("platform"), false, |_| {})
//!     .await?;
//! println!("Installed {} files", manifest.len());
//! # Ok(())
//! # }
//! ```

use crate::download::{ArchiveDownloader, DownloadProgress};
use crate::error::{Error, Result};
use crate::manifest::{InstallationManifest, MANIFEST_FILENAME};
use envkeeper_core::types::{ArchiveConfig, RuntimeConfig};
use flate2::read::GzDecoder;
use semver::Version;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Installs platform archives into a root directory
#[derive(Debug, Clone)]
pub struct ArchiveInstaller {
    downloader: ArchiveDownloader,
    archive: ArchiveConfig,
}

impl ArchiveInstaller {
    /// Create an installer from the runtime configuration
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        Ok(Self {
            downloader: ArchiveDownloader::new(&config.network)?,
            archive: config.archive.clone(),
        })
    }

    /// Archive URL for a version
    pub fn archive_url(&self, version: &Version) -> String {
        self.archive.archive_url(version)
    }

    /// Download and install `version` into `destination`
    pub async fn install<F>(
        &self,
        version: &Version,
        destination: &Path,
        dry_run: bool,
        on_progress: F,
    ) -> Result<InstallationManifest>
    where
        F: FnMut(&DownloadProgress),
    {
        let url = self.archive_url(version);
        self.install_from_url(&url, destination, dry_run, on_progress)
            .await
    }

    /// Download the archive at `url` and install it into `destination`
    ///
    /// In dry-run mode the archive is still downloaded, read completely and
    /// digested, so the returned manifest describes what a real run would
    /// extract; nothing is written.
    pub async fn install_from_url<F>(
        &self,
        url: &str,
        destination: &Path,
        dry_run: bool,
        on_progress: F,
    ) -> Result<InstallationManifest>
    where
        F: FnMut(&DownloadProgress),
    {
        let bytes = self.downloader.download(url, on_progress).await?;
        let manifest = extract_archive(&bytes, destination, dry_run)?;

        if dry_run {
            info!(
                "[dry-run] Would install {} files into {:?}",
                manifest.len(),
                destination
            );
        } else {
            manifest.save(destination)?;
            info!("Installed {} files into {:?}", manifest.len(), destination);
        }

        Ok(manifest)
    }
}

/// Archive container formats the installer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// PKZIP archive, the format platform distributions ship in
    Zip,
    /// gzip-compressed tar archive
    TarGz,
}

impl ArchiveFormat {
    /// Recognise the format from the leading magic bytes
    pub fn detect(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(b"PK") {
            Ok(Self::Zip)
        } else if bytes.starts_with(&[0x1f, 0x8b]) {
            Ok(Self::TarGz)
        } else {
            Err(Error::invalid_archive(
                "unrecognized archive format (expected zip or tar.gz)",
            ))
        }
    }
}

/// Extract an archive held in memory
///
/// Every regular file is digested; unless `dry_run`, it is also written to
/// `destination`, replacing any existing file. The manifest is returned but
/// not saved.
pub fn extract_archive(
    bytes: &[u8],
    destination: &Path,
    dry_run: bool,
) -> Result<InstallationManifest> {
    let format = ArchiveFormat::detect(bytes)?;
    debug!("Extracting {:?} archive ({} bytes)", format, bytes.len());

    if !dry_run {
        fs::create_dir_all(destination)?;
    }

    let mut extractor = Extractor {
        destination,
        dry_run,
        manifest: InstallationManifest::new(),
    };
    match format {
        ArchiveFormat::Zip => extractor.extract_zip(bytes)?,
        ArchiveFormat::TarGz => extractor.extract_tar_gz(bytes)?,
    }

    Ok(extractor.manifest)
}

struct Extractor<'a> {
    destination: &'a Path,
    dry_run: bool,
    manifest: InstallationManifest,
}

impl Extractor<'_> {
    fn extract_zip(&mut self, bytes: &[u8]) -> Result<()> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::invalid_archive(e.to_string()))?;

        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| Error::invalid_archive(e.to_string()))?;
            let raw_path = file.name().to_string();

            if file.is_dir() || raw_path.ends_with('/') || raw_path.ends_with('\\') {
                continue;
            }
            if file
                .unix_mode()
                .is_some_and(|mode| mode & S_IFMT == S_IFLNK)
            {
                debug!("Skipping symlink entry {}", raw_path);
                continue;
            }

            let declared = file.size();
            self.extract_entry(&raw_path, declared, &mut file)?;
        }

        Ok(())
    }

    fn extract_tar_gz(&mut self, bytes: &[u8]) -> Result<()> {
        let mut archive = tar::Archive::new(GzDecoder::new(bytes));
        let entries = archive
            .entries()
            .map_err(|e| Error::invalid_archive(e.to_string()))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| Error::invalid_archive(e.to_string()))?;
            let raw_path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            let entry_type = entry.header().entry_type();

            if entry_type.is_dir() {
                continue;
            }
            if !entry_type.is_file() {
                debug!("Skipping non-file entry {} ({:?})", raw_path, entry_type);
                continue;
            }

            let declared = entry.size();
            self.extract_entry(&raw_path, declared, &mut entry)?;
        }

        Ok(())
    }

    /// Read one file entry, write it unless dry-run, and record its digest
    ///
    /// The declared size only serves to detect short entries; the buffer
    /// grows with the bytes actually present.
    fn extract_entry<R: Read>(&mut self, raw_path: &str, declared: u64, reader: R) -> Result<()> {
        let relative = sanitize_entry_path(raw_path)?;
        let key = to_manifest_key(&relative);
        if key == MANIFEST_FILENAME {
            warn!("Archive contains a {} entry; ignoring it", MANIFEST_FILENAME);
            return Ok(());
        }

        let mut data = Vec::new();
        reader
            .take(declared)
            .read_to_end(&mut data)
            .map_err(|e| Error::invalid_archive(format!("{}: {}", raw_path, e)))?;
        if data.len() as u64 != declared {
            return Err(Error::invalid_archive(format!(
                "{}: declares {} bytes but holds {}",
                raw_path,
                declared,
                data.len()
            )));
        }

        let target = self.destination.join(&relative);
        if self.dry_run {
            debug!("[dry-run] Would write {:?}", target);
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, &data)?;
            debug!("Wrote {:?} ({} bytes)", target, data.len());
        }

        self.manifest.record(&key, data.as_slice())?;
        Ok(())
    }
}

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// Turn an archive entry path into a relative path that stays below the root
fn sanitize_entry_path(raw: &str) -> Result<PathBuf> {
    let normalized = raw.replace('\\', "/");
    let mut relative = PathBuf::new();

    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::invalid_archive(format!(
                    "entry '{}' escapes the installation root",
                    raw
                )));
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(Error::invalid_archive(format!("entry '{}' has no file name", raw)));
    }

    Ok(relative)
}

fn to_manifest_key(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

//! Reconciliation orchestrator
//!
//! An [`Environment`] owns the descriptor for one invocation. It is opened
//! (descriptor loaded and validated, nothing else touched), assessed with
//! [`Environment::status`], converged with [`Environment::update`], and its
//! plugin entries are edited and written back with [`Environment::save`].
//!
//! Dry-run is decided here and handed to every mutating primitive; the
//! decisions and the returned outcome are the same as for a real run.

use crate::error::Result;
use crate::report::StatusReport;
use camino::{Utf8Path, Utf8PathBuf};
use envkeeper_core::config::validate;
use envkeeper_core::types::{
    EnvironmentDescriptor, PluginEntry, RequestedVersion, RuntimeConfig, StatusItem,
};
use envkeeper_core::DescriptorFile;
use envkeeper_platform::{
    remove_installed, remove_tree, ArchiveInstaller, DownloadProgress, DriftDetector,
    InstallationManifest, PreserveList, RemovalReport, VersionProbe,
};
use envkeeper_plugins::lifecycle::{self, PluginAction};
use semver::Version;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Options for [`Environment::update`]
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Compute and report every decision without changing anything
    pub dry_run: bool,
}

/// What happened to the platform during an update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum PlatformUpdate {
    /// Platform lifecycle is managed by hand
    Manual,

    /// Installed platform already matches
    UpToDate,

    /// Platform was (or would be) removed and reinstalled
    Installed {
        version: String,
        reason: String,
        removal: RemovalReport,
        files: usize,
    },
}

/// What happened to one plugin during an update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginOutcome {
    /// Convergence ran; see the action
    Done { path: String, action: PluginAction },

    /// Convergence failed for this plugin only
    Failed { path: String, error: String },
}

impl PluginOutcome {
    /// Plugin path the outcome is about
    pub fn path(&self) -> &str {
        match self {
            PluginOutcome::Done { path, .. } | PluginOutcome::Failed { path, .. } => path,
        }
    }
}

/// Result of [`Environment::update`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateOutcome {
    pub dry_run: bool,
    pub platform: PlatformUpdate,
    pub plugins: Vec<PluginOutcome>,
}

impl UpdateOutcome {
    /// Whether any plugin failed to converge
    pub fn has_failures(&self) -> bool {
        self.plugins
            .iter()
            .any(|p| matches!(p, PluginOutcome::Failed { .. }))
    }
}

/// Edit of an existing plugin entry
#[derive(Debug, Clone, Default)]
pub struct PluginChange {
    /// New remote URL
    pub url: Option<String>,

    /// `Some(Some(b))` requires branch `b`, `Some(None)` clears the requirement
    pub branch: Option<Option<String>>,
}

/// Options for [`Environment::remove_plugin`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RemovePluginOptions {
    /// Also delete the working copy
    pub delete: bool,

    /// Delete the working copy even with uncommitted changes
    pub force: bool,

    /// Report without changing the descriptor or the disk
    pub dry_run: bool,
}

/// One environment: descriptor, runtime configuration and the components
/// that act on them
pub struct Environment {
    file: DescriptorFile,
    config: RuntimeConfig,
    detector: DriftDetector,
    installer: ArchiveInstaller,
    dirty: bool,
}

impl Environment {
    /// Load the descriptor from `dir` (or search upward from the current
    /// directory) and prepare the components
    pub fn open(dir: Option<&Utf8Path>, config: RuntimeConfig) -> Result<Self> {
        let file = DescriptorFile::load(dir)?;
        Self::from_file(file, config)
    }

    /// Wrap an already loaded descriptor
    pub fn from_file(file: DescriptorFile, config: RuntimeConfig) -> Result<Self> {
        info!("Opened environment at {}", file.root);
        Ok(Self {
            detector: DriftDetector::new(&config.layout),
            installer: ArchiveInstaller::new(&config)?,
            file,
            config,
            dirty: false,
        })
    }

    /// Replace the version probe used for drift detection
    pub fn with_probe(mut self, probe: Box<dyn VersionProbe>) -> Self {
        self.detector = DriftDetector::with_probe(&self.config.layout, probe);
        self
    }

    /// Environment root (directory of the descriptor)
    pub fn root(&self) -> &Utf8Path {
        &self.file.root
    }

    /// Descriptor file location
    pub fn descriptor_path(&self) -> &Utf8Path {
        &self.file.path
    }

    /// The descriptor as currently held in memory
    pub fn descriptor(&self) -> &EnvironmentDescriptor {
        &self.file.descriptor
    }

    /// Runtime configuration in effect
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Root of the installed platform
    pub fn platform_root(&self) -> Utf8PathBuf {
        self.file.root.join(&self.config.layout.platform_dir)
    }

    /// Whether plugin entries changed since the descriptor was loaded or saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Assess the platform and every plugin without changing anything
    pub async fn status(&self) -> Result<StatusReport> {
        let descriptor = &self.file.descriptor;
        let mut items = Vec::with_capacity(descriptor.plugins.len() + 1);

        let platform = self
            .detector
            .platform_status(
                &descriptor.requested_version(),
                self.platform_root().as_std_path(),
            )
            .await?;
        debug!("Platform {}", platform.message());
        items.push(StatusItem::Platform(platform));

        for entry in &descriptor.plugins {
            let status = lifecycle::plugin_status(entry, self.root()).await;
            debug!("Plugin '{}' {}", entry.path, status.message());
            items.push(StatusItem::Plugin(status));
        }

        Ok(StatusReport::new(items))
    }

    /// Converge the environment towards the descriptor
    ///
    /// A platform that is not up to date is forcefully removed (keeping the
    /// preserve list) and installed fresh. Missing plugins are cloned and
    /// clean plugins on the wrong branch are switched. A plugin failure is
    /// recorded in the outcome; platform failures abort.
    pub async fn update<F>(&self, options: UpdateOptions, on_progress: F) -> Result<UpdateOutcome>
    where
        F: FnMut(&DownloadProgress),
    {
        let prefix = if options.dry_run { "[dry-run] " } else { "" };
        info!("{}Updating environment at {}", prefix, self.root());

        info!("Stage 1/2: Platform");
        let platform = self.update_platform(options.dry_run, on_progress).await?;

        info!("Stage 2/2: Plugins");
        let mut plugins = Vec::with_capacity(self.file.descriptor.plugins.len());
        for entry in &self.file.descriptor.plugins {
            let outcome = match lifecycle::converge(entry, self.root(), options.dry_run).await {
                Ok(action) => PluginOutcome::Done {
                    path: entry.path.clone(),
                    action,
                },
                Err(e) => {
                    warn!("Plugin '{}' could not be updated: {}", entry.path, e);
                    PluginOutcome::Failed {
                        path: entry.path.clone(),
                        error: e.to_string(),
                    }
                }
            };
            plugins.push(outcome);
        }

        info!("{}Update complete", prefix);
        Ok(UpdateOutcome {
            dry_run: options.dry_run,
            platform,
            plugins,
        })
    }

    async fn update_platform<F>(&self, dry_run: bool, on_progress: F) -> Result<PlatformUpdate>
    where
        F: FnMut(&DownloadProgress),
    {
        let requested = self.file.descriptor.requested_version();
        let version: Version = match &requested {
            RequestedVersion::Manual => {
                info!("Platform version is managed manually; skipping");
                return Ok(PlatformUpdate::Manual);
            }
            RequestedVersion::Invalid { raw, reason } => {
                return Err(envkeeper_core::Error::invalid_version(raw, reason).into());
            }
            RequestedVersion::Pinned(version) => version.clone(),
        };

        let root = self.platform_root();
        let status = self
            .detector
            .platform_status(&requested, root.as_std_path())
            .await?;
        if status.is_up_to_date() {
            info!("Platform {} is up to date", version);
            return Ok(PlatformUpdate::UpToDate);
        }

        info!("Platform {}", status.message());
        let preserve = PreserveList::new(&self.config.preserve.paths);
        let removal = remove_tree(root.as_std_path(), &preserve, dry_run)?;

        let manifest = self
            .installer
            .install(&version, root.as_std_path(), dry_run, on_progress)
            .await?;

        Ok(PlatformUpdate::Installed {
            version: version.to_string(),
            reason: status.message().to_string(),
            removal,
            files: manifest.len(),
        })
    }

    /// Remove exactly the files recorded by the last install
    ///
    /// Returns `None` when there is no manifest to go by.
    pub fn clean(&self, dry_run: bool) -> Result<Option<RemovalReport>> {
        let root = self.platform_root();
        let Some(manifest) = InstallationManifest::load(root.as_std_path())? else {
            warn!("No installation manifest in {}; nothing to clean", root);
            return Ok(None);
        };

        let report = remove_installed(root.as_std_path(), &manifest, dry_run)?;
        Ok(Some(report))
    }

    /// Declare a new plugin
    pub fn add_plugin(&mut self, entry: PluginEntry) -> Result<()> {
        if self.file.descriptor.plugin(&entry.path).is_some() {
            return Err(envkeeper_core::Error::plugin_exists(&entry.path).into());
        }

        let mut candidate = self.file.descriptor.clone();
        candidate.plugins.push(entry.clone());
        validate(&candidate)?;

        info!("Added plugin '{}'", entry.path);
        self.file.descriptor = candidate;
        self.dirty = true;
        Ok(())
    }

    /// Change the url or branch of a declared plugin
    pub fn update_plugin(&mut self, path: &str, change: PluginChange) -> Result<&PluginEntry> {
        let path = envkeeper_core::types::normalize_plugin_path(path);
        let entry = self
            .file
            .descriptor
            .plugin_mut(&path)
            .ok_or_else(|| envkeeper_core::Error::plugin_not_found(&path))?;

        let mut changed = false;
        if let Some(url) = change.url {
            changed |= entry.url.as_deref() != Some(url.as_str());
            entry.url = Some(url);
        }
        if let Some(branch) = change.branch {
            changed |= entry.branch != branch;
            entry.branch = branch;
        }

        if changed {
            info!("Updated plugin '{}'", entry.path);
            self.dirty = true;
        }
        Ok(entry)
    }

    /// Undeclare a plugin, optionally deleting its working copy first
    ///
    /// Deleting refuses a working copy with uncommitted changes unless
    /// `force` is set; in that case the descriptor is left unchanged.
    pub async fn remove_plugin(
        &mut self,
        path: &str,
        options: RemovePluginOptions,
    ) -> Result<PluginEntry> {
        let path = envkeeper_core::types::normalize_plugin_path(path);
        let index = self
            .file
            .descriptor
            .plugins
            .iter()
            .position(|p| p.matches_path(&path))
            .ok_or_else(|| envkeeper_core::Error::plugin_not_found(&path))?;

        let entry = self.file.descriptor.plugins[index].clone();
        if options.delete {
            lifecycle::remove_working_copy(&entry, self.root(), options.force, options.dry_run)
                .await?;
        }

        if options.dry_run {
            info!("[dry-run] Would remove plugin '{}'", entry.path);
        } else {
            self.file.descriptor.plugins.remove(index);
            self.dirty = true;
            info!("Removed plugin '{}'", entry.path);
        }
        Ok(entry)
    }

    /// Write the descriptor back if plugin entries changed
    ///
    /// Returns whether anything was written.
    pub fn save(&mut self) -> Result<bool> {
        if !self.dirty {
            debug!("Descriptor unchanged; not saving");
            return Ok(false);
        }
        self.file.save()?;
        self.dirty = false;
        info!("Saved {}", self.file.path);
        Ok(true)
    }
}

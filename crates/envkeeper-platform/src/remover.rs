//! Removal of installed platform trees
//!
//! Two strategies:
//! - [`remove_tree`] deletes everything below the root except the preserve
//!   list. It is a post-order walk where each directory reports whether it
//!   was fully removed; a directory goes only when all of its children went
//!   and it is not preserved itself.
//! - [`remove_installed`] deletes exactly the files a manifest lists, prunes
//!   the directories that became empty, and deletes the manifest.
//!
//! Both take `dry_run` explicitly. A dry run walks the same entries in the
//! same order and returns the same report; it only skips the syscalls.

use crate::error::{Error, Result};
use crate::manifest::{InstallationManifest, MANIFEST_FILENAME};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What happened (or would happen) to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalAction {
    Removed,
    Preserved,
}

/// One decision of a removal run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalRecord {
    /// Slash-separated path relative to the root
    pub path: String,

    /// Whether the path is a directory
    pub is_dir: bool,

    /// The decision
    pub action: RemovalAction,
}

/// Ordered decisions of a removal run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    /// Whether the run was a dry run
    pub dry_run: bool,

    /// Decisions in traversal order
    pub entries: Vec<RemovalRecord>,
}

impl RemovalReport {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            entries: Vec::new(),
        }
    }

    fn push(&mut self, path: String, is_dir: bool, action: RemovalAction) {
        let verb = match (action, self.dry_run) {
            (RemovalAction::Removed, false) => "Removed",
            (RemovalAction::Removed, true) => "[dry-run] Would remove",
            (RemovalAction::Preserved, false) => "Preserved",
            (RemovalAction::Preserved, true) => "[dry-run] Would preserve",
        };
        debug!("{} {}", verb, path);
        self.entries.push(RemovalRecord {
            path,
            is_dir,
            action,
        });
    }

    /// Paths removed (or that would be removed)
    pub fn removed(&self) -> impl Iterator<Item = &RemovalRecord> {
        self.entries
            .iter()
            .filter(|r| r.action == RemovalAction::Removed)
    }

    /// Paths preserved
    pub fn preserved(&self) -> impl Iterator<Item = &RemovalRecord> {
        self.entries
            .iter()
            .filter(|r| r.action == RemovalAction::Preserved)
    }

    /// Number of removed paths
    pub fn removed_count(&self) -> usize {
        self.removed().count()
    }

    /// Number of preserved paths
    pub fn preserved_count(&self) -> usize {
        self.preserved().count()
    }
}

/// Root-relative paths that forceful removal must keep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreserveList {
    paths: BTreeSet<String>,
}

impl PreserveList {
    /// Build a preserve list, normalizing separators
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = paths
            .into_iter()
            .filter_map(|p| normalize_relative(p.as_ref()))
            .collect();
        Self { paths }
    }

    /// Whether `relative` is itself preserved
    pub fn contains(&self, relative: &str) -> bool {
        self.paths.contains(relative)
    }

    /// Number of preserved paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn normalize_relative(path: &str) -> Option<String> {
    let normalized = path.replace('\\', "/");
    let normalized = normalized
        .trim_start_matches("./")
        .trim_matches('/')
        .to_string();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Forcefully remove everything below `root` except the preserve list
///
/// The root directory itself is kept. A missing root yields an empty report.
pub fn remove_tree(root: &Path, preserve: &PreserveList, dry_run: bool) -> Result<RemovalReport> {
    let mut report = RemovalReport::new(dry_run);

    let metadata = match fs::symlink_metadata(root) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(report),
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_dir() {
        return Err(Error::invalid_root(
            root.display().to_string(),
            "not a directory",
        ));
    }

    info!(
        "{}Removing {:?} (preserving {} paths)",
        if dry_run { "[dry-run] " } else { "" },
        root,
        preserve.len()
    );

    let mut walker = TreeRemover {
        preserve,
        dry_run,
        report: &mut report,
    };
    walker.visit_dir(root, "")?;

    info!(
        "{}Removed {} paths, preserved {}",
        if dry_run { "[dry-run] " } else { "" },
        report.removed_count(),
        report.preserved_count()
    );
    Ok(report)
}

struct TreeRemover<'a> {
    preserve: &'a PreserveList,
    dry_run: bool,
    report: &'a mut RemovalReport,
}

impl TreeRemover<'_> {
    /// Process the children of `dir`; returns whether all of them were removed
    fn visit_dir(&mut self, dir: &Path, relative: &str) -> Result<bool> {
        let (subdirs, files) = list_children(dir)?;
        let mut fully_removed = true;

        for name in subdirs {
            let child_relative = join_relative(relative, &name);
            let child_path = dir.join(&name);

            if self.preserve.contains(&child_relative) {
                self.report
                    .push(child_relative, true, RemovalAction::Preserved);
                fully_removed = false;
                continue;
            }

            if self.visit_dir(&child_path, &child_relative)? {
                if !self.dry_run {
                    fs::remove_dir(&child_path)?;
                }
                self.report.push(child_relative, true, RemovalAction::Removed);
            } else {
                fully_removed = false;
            }
        }

        for name in files {
            let child_relative = join_relative(relative, &name);

            if self.preserve.contains(&child_relative) {
                self.report
                    .push(child_relative, false, RemovalAction::Preserved);
                fully_removed = false;
                continue;
            }

            if !self.dry_run {
                fs::remove_file(dir.join(&name))?;
            }
            self.report
                .push(child_relative, false, RemovalAction::Removed);
        }

        Ok(fully_removed)
    }
}

/// Sorted child names of `dir`, split into real directories and everything
/// else. Symlinks land in the second group and are never followed.
fn list_children(dir: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let mut subdirs = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            subdirs.push(name);
        } else {
            files.push(name);
        }
    }

    subdirs.sort();
    files.sort();
    Ok((subdirs, files))
}

fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Remove exactly the files listed in `manifest`, then prune directories
/// left empty, then delete the manifest itself
pub fn remove_installed(
    root: &Path,
    manifest: &InstallationManifest,
    dry_run: bool,
) -> Result<RemovalReport> {
    let mut report = RemovalReport::new(dry_run);
    let mut removed: HashSet<PathBuf> = HashSet::new();
    let mut affected_dirs: BTreeSet<String> = BTreeSet::new();

    info!(
        "{}Removing {} installed files from {:?}",
        if dry_run { "[dry-run] " } else { "" },
        manifest.len(),
        root
    );

    for (relative, _) in manifest.iter() {
        let target = root.join(relative);
        match fs::symlink_metadata(&target) {
            Ok(metadata) if !metadata.is_dir() => {
                if !dry_run {
                    fs::remove_file(&target)?;
                }
                removed.insert(target);
                report.push(relative.to_string(), false, RemovalAction::Removed);
            }
            Ok(_) => {
                debug!("Skipping {}: replaced by a directory", relative);
                continue;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Skipping {}: already gone", relative);
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        if let Some((parent, _)) = relative.rsplit_once('/') {
            affected_dirs.insert(parent.to_string());
        }
    }

    // Deepest directories first so a parent is checked after all its children
    let mut ordered: Vec<String> = affected_dirs.into_iter().collect();
    ordered.sort_by(|a, b| depth(b).cmp(&depth(a)).then_with(|| a.cmp(b)));

    for start in ordered {
        let mut current = Some(start);
        while let Some(relative) = current {
            let dir = root.join(&relative);
            if removed.contains(&dir) || !dir.is_dir() {
                break;
            }
            if !is_effectively_empty(&dir, &removed)? {
                break;
            }
            if !dry_run {
                fs::remove_dir(&dir)?;
            }
            removed.insert(dir);
            current = relative.rsplit_once('/').map(|(parent, _)| parent.to_string());
            report.push(relative, true, RemovalAction::Removed);
        }
    }

    let manifest_path = InstallationManifest::path_in(root);
    if manifest_path.exists() {
        if !dry_run {
            InstallationManifest::delete(root)?;
        }
        report.push(MANIFEST_FILENAME.to_string(), false, RemovalAction::Removed);
    }

    Ok(report)
}

fn depth(relative: &str) -> usize {
    relative.matches('/').count()
}

/// Whether `dir` has no children other than ones already removed this run
fn is_effectively_empty(dir: &Path, removed: &HashSet<PathBuf>) -> Result<bool> {
    for entry in fs::read_dir(dir)? {
        if !removed.contains(&entry?.path()) {
            return Ok(false);
        }
    }
    Ok(true)
}

//! Plugin lifecycle
//!
//! Assessment and convergence of plugin working copies. Each plugin lives
//! at `<environment root>/<entry.path>` and is judged only against its own
//! descriptor entry. A failure while handling one plugin is reported for that
//! plugin and never stops the caller from handling the rest.

use crate::error::{Error, Result};
use crate::git;
use camino::{Utf8Path, Utf8PathBuf};
use envkeeper_core::types::{PluginEntry, PluginStatus};
use serde::Serialize;
use tracing::{debug, info, warn};

/// What convergence did (or would do) for one plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum PluginAction {
    /// The working copy was missing and has been cloned
    Cloned { url: String },

    /// The working copy was switched to the required branch
    BranchSwitched { from: Option<String>, to: String },

    /// Nothing to do
    Unchanged,

    /// Missing working copy without a url to clone from
    SkippedMissingUrl,

    /// Directory exists but is not a working copy
    SkippedNotRepository,

    /// On the wrong branch with uncommitted changes
    SkippedDirty,
}

impl PluginAction {
    /// Whether the working copy was (or would be) changed
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Cloned { .. } | Self::BranchSwitched { .. })
    }
}

/// Location of a plugin working copy
pub fn plugin_dir(entry: &PluginEntry, root: &Utf8Path) -> Utf8PathBuf {
    root.join(&entry.path)
}

/// Assess one plugin against its descriptor entry
///
/// Git failures become the status message.
pub async fn plugin_status(entry: &PluginEntry, root: &Utf8Path) -> PluginStatus {
    match assess(entry, root).await {
        Ok(status) => status,
        Err(e) => {
            warn!("Could not assess plugin '{}': {}", entry.path, e);
            PluginStatus::drift(entry.clone(), format!("could not be checked: {}", e))
        }
    }
}

async fn assess(entry: &PluginEntry, root: &Utf8Path) -> Result<PluginStatus> {
    let Some(url) = entry.remote_url() else {
        return Ok(PluginStatus::drift(entry.clone(), "is missing a url."));
    };

    let dir = plugin_dir(entry, root);
    if !git::is_repository(&dir).await? {
        return Ok(PluginStatus::drift(entry.clone(), "is not a git repository."));
    }

    // Informational only; the remote is not part of the status
    if let Some(origin) = git::remote_url(&dir, "origin").await? {
        if origin != url {
            warn!(
                "Plugin '{}' tracks origin {} but declares {}",
                entry.path, origin, url
            );
        }
    }

    let Some(required) = entry.required_branch() else {
        return Ok(PluginStatus::ok(entry.clone()));
    };

    match git::current_branch(&dir).await? {
        None => Ok(PluginStatus::drift(entry.clone(), "is not on a branch.")),
        Some(actual) if actual != required => Ok(PluginStatus::drift(
            entry.clone(),
            format!("is on branch {} but should be {}.", actual, required),
        )),
        Some(_) => Ok(PluginStatus::ok(entry.clone())),
    }
}

/// Whether the plugin's working copy has no uncommitted changes
///
/// A directory that does not exist is clean; one that exists but is not a
/// working copy is an error.
pub async fn is_clean(entry: &PluginEntry, root: &Utf8Path) -> Result<bool> {
    let dir = plugin_dir(entry, root);
    if !dir.exists() {
        return Ok(true);
    }
    if !git::is_repository(&dir).await? {
        return Err(Error::not_a_repository(dir.as_str()));
    }
    git::is_clean(&dir).await
}

/// Bring one plugin in line with its entry
///
/// Missing working copies are cloned (on the required branch when there is
/// one). Existing clean copies on the wrong branch are switched; dirty ones
/// are left alone.
pub async fn converge(entry: &PluginEntry, root: &Utf8Path, dry_run: bool) -> Result<PluginAction> {
    let dir = plugin_dir(entry, root);
    let prefix = if dry_run { "[dry-run] " } else { "" };

    if !dir.exists() {
        let Some(url) = entry.remote_url() else {
            warn!("Plugin '{}' is missing and has no url; skipping", entry.path);
            return Ok(PluginAction::SkippedMissingUrl);
        };

        info!("{}Cloning plugin '{}' from {}", prefix, entry.path, url);
        if !dry_run {
            git::clone_repository(url, &dir, entry.required_branch()).await?;
        }
        return Ok(PluginAction::Cloned {
            url: url.to_string(),
        });
    }

    if !git::is_repository(&dir).await? {
        warn!("Plugin '{}' is not a git repository; skipping", entry.path);
        return Ok(PluginAction::SkippedNotRepository);
    }

    let Some(required) = entry.required_branch() else {
        debug!("Plugin '{}' has no required branch", entry.path);
        return Ok(PluginAction::Unchanged);
    };

    let actual = git::current_branch(&dir).await?;
    if actual.as_deref() == Some(required) {
        return Ok(PluginAction::Unchanged);
    }

    if !git::is_clean(&dir).await? {
        warn!(
            "Plugin '{}' has uncommitted changes; not switching to {}",
            entry.path, required
        );
        return Ok(PluginAction::SkippedDirty);
    }

    info!(
        "{}Switching plugin '{}' to branch {}",
        prefix, entry.path, required
    );
    if !dry_run {
        git::checkout_branch(&dir, required).await?;
    }
    Ok(PluginAction::BranchSwitched {
        from: actual,
        to: required.to_string(),
    })
}

/// Delete a plugin's working copy
///
/// Refuses when the copy has uncommitted changes unless `force` is set.
/// Returns whether there was anything to delete.
pub async fn remove_working_copy(
    entry: &PluginEntry,
    root: &Utf8Path,
    force: bool,
    dry_run: bool,
) -> Result<bool> {
    let dir = plugin_dir(entry, root);
    if !dir.exists() {
        return Ok(false);
    }

    if !force && !is_clean(entry, root).await? {
        return Err(Error::dirty_working_copy(&entry.path));
    }

    if dry_run {
        info!("[dry-run] Would delete {}", dir);
    } else {
        tokio::fs::remove_dir_all(&dir).await?;
        info!("Deleted {}", dir);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn root(temp_dir: &TempDir) -> &Utf8Path {
        Utf8Path::from_path(temp_dir.path()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_url_is_reported_first() {
        let temp_dir = TempDir::new().unwrap();
        let entry = PluginEntry::new("plugins/blog").with_url("  ");

        let status = plugin_status(&entry, root(&temp_dir)).await;
        assert!(!status.is_up_to_date());
        assert_eq!(status.message(), "is missing a url.");
    }

    #[tokio::test]
    async fn test_missing_directory_is_not_a_repository() {
        let temp_dir = TempDir::new().unwrap();
        let entry = PluginEntry::new("plugins/blog").with_url("https://example.com/blog.git");

        let status = plugin_status(&entry, root(&temp_dir)).await;
        assert_eq!(status.message(), "is not a git repository.");
        assert_eq!(status.entry(), &entry);
    }

    #[tokio::test]
    async fn test_missing_directory_is_clean() {
        let temp_dir = TempDir::new().unwrap();
        let entry = PluginEntry::new("plugins/blog");
        assert!(is_clean(&entry, root(&temp_dir)).await.unwrap());
    }

    #[tokio::test]
    async fn test_plain_directory_is_not_clean_checkable() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("plugins/blog")).unwrap();
        let entry = PluginEntry::new("plugins/blog");

        let err = is_clean(&entry, root(&temp_dir)).await.unwrap_err();
        assert!(matches!(err, Error::NotARepository { .. }));
    }

    #[tokio::test]
    async fn test_converge_without_url_skips() {
        let temp_dir = TempDir::new().unwrap();
        let entry = PluginEntry::new("plugins/blog");

        let action = converge(&entry, root(&temp_dir), false).await.unwrap();
        assert_eq!(action, PluginAction::SkippedMissingUrl);
        assert!(!action.is_change());
    }

    #[tokio::test]
    async fn test_converge_dry_run_does_not_clone() {
        let temp_dir = TempDir::new().unwrap();
        let entry = PluginEntry::new("plugins/blog").with_url("https://example.invalid/blog.git");

        let action = converge(&entry, root(&temp_dir), true).await.unwrap();
        assert_eq!(
            action,
            PluginAction::Cloned {
                url: "https://example.invalid/blog.git".to_string()
            }
        );
        assert!(!temp_dir.path().join("plugins/blog").exists());
    }

    #[tokio::test]
    async fn test_remove_absent_working_copy() {
        let temp_dir = TempDir::new().unwrap();
        let entry = PluginEntry::new("plugins/blog");
        assert!(!remove_working_copy(&entry, root(&temp_dir), false, false)
            .await
            .unwrap());
    }
}

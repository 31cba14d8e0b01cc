//! Working copy queries

use crate::error::Result;
use crate::git::command::{git, git_stdout};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

/// Whether `path` is the top level of a git working copy
///
/// A plain subdirectory of some enclosing repository does not count.
pub async fn is_repository(path: &Utf8Path) -> Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }

    let output = git(path, &["rev-parse", "--show-toplevel"]).await?;
    if !output.status.success() {
        return Ok(false);
    }

    let toplevel = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let toplevel = Utf8PathBuf::from(toplevel).canonicalize_utf8()?;
    let path = path.canonicalize_utf8()?;

    debug!("Top level of {} is {}", path, toplevel);
    Ok(toplevel == path)
}

/// Whether the working copy has no staged, unstaged or untracked changes
pub async fn is_clean(path: &Utf8Path) -> Result<bool> {
    let status = git_stdout(path, &["status", "--porcelain"]).await?;
    Ok(status.is_empty())
}

/// URL of the named remote, `None` when it is not configured
pub async fn remote_url(path: &Utf8Path, name: &str) -> Result<Option<String>> {
    let output = git(path, &["remote", "get-url", name]).await?;

    if !output.status.success() {
        return Ok(None);
    }

    Ok(Some(
        String::from_utf8_lossy(&output.stdout).trim().to_string(),
    ))
}

//! Branch queries and switching

use crate::error::{Error, Result};
use crate::git::command::git;
use camino::Utf8Path;
use tracing::info;

/// Name of the checked-out local branch, `None` when HEAD is detached
pub async fn current_branch(path: &Utf8Path) -> Result<Option<String>> {
    let output = git(path, &["symbolic-ref", "--quiet", "--short", "HEAD"]).await?;

    if output.status.success() {
        let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
        return Ok(Some(branch));
    }

    // --quiet makes a detached HEAD exit with 1 and print nothing
    if output.status.code() == Some(1) && output.stderr.is_empty() {
        return Ok(None);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(Error::git_operation(format!(
        "Failed to get current branch: {}",
        stderr.trim()
    )))
}

/// Check out `branch_name`, creating it from a same-named remote branch if needed
pub async fn checkout_branch(path: &Utf8Path, branch_name: &str) -> Result<()> {
    info!("Checking out branch: {}", branch_name);

    let output = git(path, &["checkout", branch_name]).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::git_operation(format!(
            "git checkout failed: {}",
            stderr.trim()
        )));
    }

    info!("Checked out branch: {}", branch_name);
    Ok(())
}

//! Repository cloning

use crate::error::{Error, Result};
use crate::git::command::git;
use camino::Utf8Path;
use tracing::info;

/// Clone `url` into `destination`, optionally checking out `branch`
///
/// The destination must not exist yet; missing parent directories are created.
pub async fn clone_repository(url: &str, destination: &Utf8Path, branch: Option<&str>) -> Result<()> {
    info!("Cloning repository: {} -> {}", url, destination);

    if destination.exists() {
        return Err(Error::repo_exists(destination.as_str()));
    }

    let name = destination
        .file_name()
        .ok_or_else(|| Error::clone_failed(format!("invalid destination {}", destination)))?;
    let parent = match destination.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    tokio::fs::create_dir_all(parent).await?;

    let mut args = vec!["clone"];
    if let Some(branch) = branch {
        args.extend(["--branch", branch]);
    }
    args.extend(["--", url, name]);

    let output = git(parent, &args).await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::clone_failed(stderr.trim()));
    }

    info!("Repository cloned successfully");
    Ok(())
}

//! Running the git executable

use crate::error::{Error, Result};
use camino::Utf8Path;
use std::io;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

/// Run `git <args>` in `dir`, returning the raw output whatever the exit code
pub(crate) async fn git(dir: &Utf8Path, args: &[&str]) -> Result<Output> {
    debug!("Running: git {} (in {})", args.join(" "), dir);

    Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound if !dir.exists() => Error::Io(e),
            io::ErrorKind::NotFound => Error::GitNotFound,
            _ => Error::Io(e),
        })
}

/// Run `git <args>` in `dir` and return trimmed stdout, failing on non-zero exit
pub(crate) async fn git_stdout(dir: &Utf8Path, args: &[&str]) -> Result<String> {
    let output = git(dir, args).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::git_operation(format!(
            "git {} failed: {}",
            args.first().copied().unwrap_or_default(),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

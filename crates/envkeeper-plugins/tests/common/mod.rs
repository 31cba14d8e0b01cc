//! Common test helpers for envkeeper-plugins integration tests
//!
//! Builds throwaway git repositories with the real `git` binary:
//! an "origin" with a `main` and a `release-2.0` branch, and an environment
//! root to clone plugins into.

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Run git in `dir`, panicking on failure
pub fn run_git(dir: &Utf8Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args([
            "-c",
            "user.name=Envkeeper Tests",
            "-c",
            "user.email=tests@envkeeper.dev",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .output()
        .expect("git is installed");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// An origin repository plus an empty environment root
pub struct GitFixture {
    _temp: TempDir,
    pub origin: Utf8PathBuf,
    pub root: Utf8PathBuf,
}

impl GitFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let base = Utf8Path::from_path(temp.path()).unwrap().to_path_buf();

        let origin = base.join("origin");
        std::fs::create_dir_all(&origin).unwrap();
        run_git(&origin, &["init", "--quiet"]);
        run_git(&origin, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        std::fs::write(origin.join("README.md"), "plugin\n").unwrap();
        run_git(&origin, &["add", "README.md"]);
        run_git(&origin, &["commit", "--quiet", "-m", "Initial commit"]);
        run_git(&origin, &["branch", "release-2.0"]);

        let root = base.join("env");
        std::fs::create_dir_all(&root).unwrap();

        Self {
            _temp: temp,
            origin,
            root,
        }
    }

    /// URL of the origin repository
    pub fn url(&self) -> String {
        self.origin.to_string()
    }

    /// Clone origin into `root/<path>` on `branch` with the plain git binary
    pub fn clone_plugin(&self, path: &str, branch: &str) -> Utf8PathBuf {
        let dest = self.root.join(path);
        run_git(
            &self.root,
            &["clone", "--quiet", "--branch", branch, self.origin.as_str(), dest.as_str()],
        );
        dest
    }
}

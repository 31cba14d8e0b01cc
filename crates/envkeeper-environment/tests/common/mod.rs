//! Common test infrastructure for envkeeper-environment tests
//!
//! - environment fixtures: a temp root with a descriptor and a mock archive server
//! - archive builders for the platform distribution
//! - git helpers for plugin origins
//! - a static version probe

#![allow(dead_code)]

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use envkeeper_core::types::RuntimeConfig;
use envkeeper_environment::Environment;
use envkeeper_platform::VersionProbe;
use semver::Version;
use std::env::consts::EXE_SUFFIX;
use std::io::{Cursor, Write};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;

// ─── Archives ────────────────────────────────────────────────────────────────

pub fn build_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().unix_permissions(0o755);
    for (path, data) in files {
        writer.start_file(*path, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn platform_archive() -> Vec<u8> {
    let binary = format!("platform{}", EXE_SUFFIX);
    build_archive(&[
        (binary.as_str(), b"#!/bin/sh\necho 2.1.7\n"),
        ("config/default.json", b"{\"port\": 8080}\n"),
        ("lib/runtime.so", b"\x7fELF runtime"),
    ])
}

pub const PLATFORM_ARCHIVE_FILES: usize = 3;

pub async fn mock_archive(server: &MockServer, version: &str, content: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!("/platform-{}.zip", version)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
        .mount(server)
        .await;
}

// ─── Version probe ───────────────────────────────────────────────────────────

pub struct StaticVersionProbe(pub Version);

#[async_trait]
impl VersionProbe for StaticVersionProbe {
    async fn installed_version(&self, _binary: &Path) -> envkeeper_platform::Result<Option<Version>> {
        Ok(Some(self.0.clone()))
    }
}

// ─── Git ─────────────────────────────────────────────────────────────────────

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

/// Create a repository with `main` and `release-2.0` branches
pub fn create_origin(dir: &Utf8Path) {
    std::fs::create_dir_all(dir).unwrap();
    run_git(dir, &["init", "--quiet"]);
    run_git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    std::fs::write(dir.join("plugin.json"), "{}\n").unwrap();
    run_git(dir, &["add", "plugin.json"]);
    run_git(dir, &["commit", "--quiet", "-m", "Initial commit"]);
    run_git(dir, &["branch", "release-2.0"]);
}

// ─── Environment fixture ─────────────────────────────────────────────────────

pub struct EnvFixture {
    _temp: TempDir,
    pub base: Utf8PathBuf,
    pub root: Utf8PathBuf,
    pub server: MockServer,
}

impl EnvFixture {
    /// Temp environment root containing `descriptor`, plus a mock archive
    /// server serving platform 2.1.0
    pub async fn new(descriptor: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let base = Utf8Path::from_path(temp.path()).unwrap().to_path_buf();
        let root = base.join("env");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("environment.json"), descriptor).unwrap();

        let server = MockServer::start().await;
        mock_archive(&server, "2.1.0", platform_archive()).await;

        Self {
            _temp: temp,
            base,
            root,
            server,
        }
    }

    pub fn config(&self) -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.archive.base_url = self.server.uri();
        config
    }

    /// Open the environment with a probe reporting `installed`
    pub fn open(&self, installed: &str) -> Environment {
        Environment::open(Some(&self.root), self.config())
            .unwrap()
            .with_probe(Box::new(StaticVersionProbe(
                Version::parse(installed).unwrap(),
            )))
    }

    pub fn platform(&self) -> Utf8PathBuf {
        self.root.join("platform")
    }
}

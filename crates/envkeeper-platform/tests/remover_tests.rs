//! Removal of installed trees

mod common;

use common::*;
use envkeeper_core::types::PreserveConfig;
use envkeeper_platform::{
    remove_installed, remove_tree, ArchiveInstaller, InstallationManifest, PreserveList,
    RemovalAction,
};
use semver::Version;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::MockServer;

async fn install_standard(root: &Path) -> InstallationManifest {
    let server = MockServer::start().await;
    mock_archive(&server, "2.1.0", standard_archive()).await;
    ArchiveInstaller::new(&config_for_server(&server))
        .unwrap()
        .install(&Version::new(2, 1, 0), root, false, |_| {})
        .await
        .unwrap()
}

fn add_user_state(root: &Path) {
    fs::write(root.join("config/local.json"), "{\"debug\": true}").unwrap();
    fs::create_dir_all(root.join("data/db")).unwrap();
    fs::write(root.join("data/db/store.bin"), "rows").unwrap();
    fs::create_dir_all(root.join("logs")).unwrap();
    fs::write(root.join("logs/app.log"), "started").unwrap();
}

#[tokio::test]
async fn test_forceful_removal_keeps_default_preserve_list() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    install_standard(root).await;
    add_user_state(root);

    let preserve = PreserveList::new(PreserveConfig::default().paths);
    let report = remove_tree(root, &preserve, false).unwrap();

    assert!(root.join("config/local.json").exists());
    assert!(root.join("data/db/store.bin").exists());
    assert!(root.join("logs/app.log").exists());
    assert!(!root.join("config/default.json").exists());
    assert!(!root.join("lib").exists());
    assert!(!root.join(binary_entry()).exists());
    assert!(!InstallationManifest::path_in(root).exists());

    for record in report.removed() {
        assert!(!record.path.starts_with("data"));
        assert!(!record.path.starts_with("logs"));
        assert_ne!(record.path, "config");
    }
}

#[tokio::test]
async fn test_forceful_removal_second_run_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    install_standard(root).await;
    add_user_state(root);

    let preserve = PreserveList::new(PreserveConfig::default().paths);
    remove_tree(root, &preserve, false).unwrap();
    let second = remove_tree(root, &preserve, false).unwrap();

    assert_eq!(second.removed_count(), 0);
    assert!(second
        .entries
        .iter()
        .all(|r| r.action == RemovalAction::Preserved));
}

#[tokio::test]
async fn test_clean_removal_leaves_unlisted_files() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let manifest = install_standard(root).await;
    add_user_state(root);

    let report = remove_installed(root, &manifest, false).unwrap();

    assert_eq!(report.removed().filter(|r| !r.is_dir).count(), manifest.len() + 1);
    assert!(root.join("config/local.json").exists());
    assert!(root.join("data/db/store.bin").exists());
    assert!(!root.join("lib").exists());
    assert!(!root.join("README.md").exists());
    assert!(InstallationManifest::load(root).unwrap().is_none());
}

#[tokio::test]
async fn test_clean_dry_run_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let manifest = install_standard(root).await;

    let report = remove_installed(root, &manifest, true).unwrap();

    assert!(report.dry_run);
    assert!(report.removed_count() > manifest.len());
    for (path, _) in manifest.iter() {
        assert!(root.join(path).exists());
    }
    assert!(InstallationManifest::path_in(root).exists());
}

//! Archive installer tests against a mock HTTP server

mod common;

use common::*;
use envkeeper_core::hashing;
use envkeeper_platform::{ArchiveInstaller, Error, InstallationManifest, MANIFEST_FILENAME};
use semver::Version;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_install_round_trip_digests_match_disk() {
    let server = MockServer::start().await;
    mock_archive(&server, "2.1.0", standard_archive()).await;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("platform");
    let installer = ArchiveInstaller::new(&config_for_server(&server)).unwrap();

    let manifest = installer
        .install(&Version::new(2, 1, 0), &root, false, |_| {})
        .await
        .unwrap();

    assert_eq!(manifest.len(), STANDARD_ARCHIVE_FILES);
    for (path, digest) in manifest.iter() {
        let on_disk = hashing::digest_file(&root.join(path)).unwrap();
        assert_eq!(on_disk, digest, "digest mismatch for {}", path);
    }

    let saved = InstallationManifest::load(&root).unwrap().unwrap();
    assert_eq!(saved, manifest);
}

#[tokio::test]
async fn test_dry_run_reports_same_file_count_and_writes_nothing() {
    let server = MockServer::start().await;
    mock_archive(&server, "2.1.0", standard_archive()).await;

    let temp_dir = TempDir::new().unwrap();
    let installer = ArchiveInstaller::new(&config_for_server(&server)).unwrap();

    let dry_root = temp_dir.path().join("dry");
    let dry = installer
        .install(&Version::new(2, 1, 0), &dry_root, true, |_| {})
        .await
        .unwrap();
    assert!(!dry_root.exists());

    let real_root = temp_dir.path().join("real");
    let real = installer
        .install(&Version::new(2, 1, 0), &real_root, false, |_| {})
        .await
        .unwrap();

    assert_eq!(dry.len(), real.len());
    assert_eq!(dry, real);
}

#[tokio::test]
async fn test_progress_is_reported_until_complete() {
    let server = MockServer::start().await;
    let archive = standard_archive();
    let size = archive.len() as u64;
    mock_archive(&server, "2.1.0", archive).await;

    let temp_dir = TempDir::new().unwrap();
    let installer = ArchiveInstaller::new(&config_for_server(&server)).unwrap();

    let mut updates = Vec::new();
    installer
        .install(&Version::new(2, 1, 0), temp_dir.path(), true, |p| {
            updates.push(*p)
        })
        .await
        .unwrap();

    assert!(updates.len() >= 2);
    assert_eq!(updates[0].downloaded_bytes, 0);
    let last = updates.last().unwrap();
    assert_eq!(last.downloaded_bytes, size);
    assert_eq!(last.total_bytes, Some(size));
    assert_eq!(last.fraction(), Some(1.0));
}

#[tokio::test]
async fn test_missing_version_is_version_not_found() {
    let server = MockServer::start().await;
    mock_archive_status(&server, "9.9.9", 404).await;

    let temp_dir = TempDir::new().unwrap();
    let installer = ArchiveInstaller::new(&config_for_server(&server)).unwrap();

    let err = installer
        .install(&Version::new(9, 9, 9), temp_dir.path(), false, |_| {})
        .await
        .unwrap_err();

    match err {
        Error::VersionNotFound { url } => assert!(url.ends_with("/platform-9.9.9.zip")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!temp_dir.path().join(MANIFEST_FILENAME).exists());
}

#[tokio::test]
async fn test_server_error_is_download_failed() {
    let server = MockServer::start().await;
    mock_archive_status(&server, "2.1.0", 503).await;

    let temp_dir = TempDir::new().unwrap();
    let installer = ArchiveInstaller::new(&config_for_server(&server)).unwrap();

    let err = installer
        .install(&Version::new(2, 1, 0), temp_dir.path(), false, |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DownloadFailed { status: 503, .. }));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_malformed_archive_writes_no_manifest() {
    let server = MockServer::start().await;
    mock_archive(&server, "2.1.0", b"this is not an archive".to_vec()).await;

    let temp_dir = TempDir::new().unwrap();
    let installer = ArchiveInstaller::new(&config_for_server(&server)).unwrap();

    let err = installer
        .install(&Version::new(2, 1, 0), temp_dir.path(), false, |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidArchive { .. }));
    assert!(InstallationManifest::load(temp_dir.path()).unwrap().is_none());
}

#[tokio::test]
async fn test_directory_and_link_entries_are_not_recorded() {
    let server = MockServer::start().await;
    mock_archive(
        &server,
        "2.1.0",
        build_archive_with_extras(&[("README.md", b"docs"), ("docs/guide.md", b"guide")]),
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let installer = ArchiveInstaller::new(&config_for_server(&server)).unwrap();

    let manifest = installer
        .install(&Version::new(2, 1, 0), temp_dir.path(), false, |_| {})
        .await
        .unwrap();

    let paths: Vec<&str> = manifest.iter().map(|(p, _)| p).collect();
    assert_eq!(paths, vec!["README.md", "docs/guide.md"]);
    assert!(fs::symlink_metadata(temp_dir.path().join("docs/latest")).is_err());
}

#[tokio::test]
async fn test_reinstall_is_idempotent() {
    let server = MockServer::start().await;
    mock_archive(&server, "2.1.0", standard_archive()).await;

    let temp_dir = TempDir::new().unwrap();
    let installer = ArchiveInstaller::new(&config_for_server(&server)).unwrap();

    let first = installer
        .install(&Version::new(2, 1, 0), temp_dir.path(), false, |_| {})
        .await
        .unwrap();
    let second = installer
        .install(&Version::new(2, 1, 0), temp_dir.path(), false, |_| {})
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_tar_gz_distribution_installs_through_custom_template() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/platform-2.1.0.tar.gz"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(build_tar_gz(&[("README.md", b"docs"), ("bin/tool", b"x")])),
        )
        .mount(&server)
        .await;

    let mut config = config_for_server(&server);
    config.archive.url_template = "{base}/{platform}-{version}.tar.gz".to_string();
    let temp_dir = TempDir::new().unwrap();
    let installer = ArchiveInstaller::new(&config).unwrap();

    let manifest = installer
        .install(&Version::new(2, 1, 0), temp_dir.path(), false, |_| {})
        .await
        .unwrap();

    assert_eq!(manifest.len(), 2);
    assert!(InstallationManifest::load(temp_dir.path()).unwrap().is_some());
}

//! Runtime configuration types for operational parameters
//!
//! These types control where archives come from, how the platform root is
//! laid out, network timeouts, and which paths survive a forceful removal.

use serde::{Deserialize, Serialize};

/// Complete runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Archive location settings
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Platform root layout
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Paths kept by forceful removal
    #[serde(default)]
    pub preserve: PreserveConfig,
}

/// Where versioned platform archives are downloaded from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArchiveConfig {
    /// Base URL substituted for `{base}`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// URL template with `{base}`, `{platform}` and `{version}` placeholders
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// Distribution name substituted for `{platform}`
    #[serde(default = "default_platform_name")]
    pub platform_name: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            url_template: default_url_template(),
            platform_name: default_platform_name(),
        }
    }
}

impl ArchiveConfig {
    /// Resolve the archive URL for a version
    pub fn archive_url(&self, version: &semver::Version) -> String {
        self.url_template
            .replace("{base}", self.base_url.trim_end_matches('/'))
            .replace("{platform}", &self.platform_name)
            .replace("{version}", &version.to_string())
    }
}

fn default_base_url() -> String {
    "https://downloads.envkeeper.dev/releases".to_string()
}
fn default_url_template() -> String {
    "{base}/{platform}-{version}.zip".to_string()
}
fn default_platform_name() -> String {
    "platform".to_string()
}

/// Network and HTTP configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Connect/request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Whole-download timeout in seconds
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            download_timeout_secs: default_download_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_http_timeout() -> u64 {
    30
}
fn default_download_timeout() -> u64 {
    600 // 10 minutes
}
fn default_user_agent() -> String {
    format!(
        "envkeeper/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Layout of an environment on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LayoutConfig {
    /// Platform root, relative to the descriptor directory
    #[serde(default = "default_platform_dir")]
    pub platform_dir: String,

    /// Platform executable name, without the OS executable suffix
    #[serde(default = "default_binary_name")]
    pub binary_name: String,

    /// Argument that makes the platform executable print its version
    #[serde(default = "default_version_flag")]
    pub version_flag: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            platform_dir: default_platform_dir(),
            binary_name: default_binary_name(),
            version_flag: default_version_flag(),
        }
    }
}

impl LayoutConfig {
    /// Executable file name including the OS suffix
    pub fn binary_file_name(&self) -> String {
        format!("{}{}", self.binary_name, std::env::consts::EXE_SUFFIX)
    }
}

fn default_platform_dir() -> String {
    "platform".to_string()
}
fn default_binary_name() -> String {
    "platform".to_string()
}
fn default_version_flag() -> String {
    "--version".to_string()
}

/// Preserve list for forceful removal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PreserveConfig {
    /// Root-relative paths (files or directories)
    #[serde(default = "default_preserve_paths")]
    pub paths: Vec<String>,
}

impl Default for PreserveConfig {
    fn default() -> Self {
        Self {
            paths: default_preserve_paths(),
        }
    }
}

/// Locally edited configuration, user data, logs and plugin payloads
pub const DEFAULT_PRESERVE_PATHS: &[&str] = &["config/local.json", "data", "logs", "plugins"];

fn default_preserve_paths() -> Vec<String> {
    DEFAULT_PRESERVE_PATHS.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;

    #[test]
    fn test_default_archive_url() {
        let archive = ArchiveConfig::default();
        assert_eq!(
            archive.archive_url(&Version::new(2, 1, 0)),
            "https://downloads.envkeeper.dev/releases/platform-2.1.0.zip"
        );
    }

    #[test]
    fn test_custom_archive_template() {
        let archive = ArchiveConfig {
            base_url: "http://127.0.0.1:8080/".to_string(),
            url_template: "{base}/v{version}/{platform}.tar.gz".to_string(),
            platform_name: "Acme".to_string(),
        };
        assert_eq!(
            archive.archive_url(&Version::new(1, 16, 3)),
            "http://127.0.0.1:8080/v1.16.3/Acme.tar.gz"
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
archive:
  platform-name: Acme
layout:
  platform-dir: runtime
"#;
        let config: RuntimeConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.archive.platform_name, "Acme");
        assert_eq!(config.archive.url_template, default_url_template());
        assert_eq!(config.layout.platform_dir, "runtime");
        assert_eq!(config.layout.binary_name, "platform");
        assert_eq!(config.preserve.paths.len(), DEFAULT_PRESERVE_PATHS.len());
    }

    #[test]
    fn test_binary_file_name_has_os_suffix() {
        let layout = LayoutConfig::default();
        assert!(layout.binary_file_name().starts_with("platform"));
        assert!(layout
            .binary_file_name()
            .ends_with(std::env::consts::EXE_SUFFIX));
    }
}

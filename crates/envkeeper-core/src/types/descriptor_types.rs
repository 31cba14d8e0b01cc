//! Environment descriptor types (environment.json)
//!
//! The descriptor is the user-edited declaration of desired state. Every
//! object carries a flattened `extra` map so keys this version does not know
//! about survive a load/save cycle untouched.

use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Platform version sentinel meaning "managed manually"
pub const CUSTOM_VERSION: &str = "custom";

/// Root of the descriptor file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentDescriptor {
    /// Organization identity used for generated names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<Organization>,

    /// Pinned platform distribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformConfig>,

    /// Plugin working copies, in declaration order
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,

    /// Keys not understood by this version
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EnvironmentDescriptor {
    /// Create a descriptor for a new environment
    pub fn new(organization: Organization, platform_version: Option<String>) -> Self {
        Self {
            organization: Some(organization),
            platform: Some(PlatformConfig {
                version: platform_version,
                extra: Map::new(),
            }),
            plugins: Vec::new(),
            extra: Map::new(),
        }
    }

    /// The requested platform version (manual when no platform block exists)
    pub fn requested_version(&self) -> RequestedVersion {
        self.platform
            .as_ref()
            .map(PlatformConfig::requested_version)
            .unwrap_or(RequestedVersion::Manual)
    }

    /// Find a plugin entry by its path
    pub fn plugin(&self, path: &str) -> Option<&PluginEntry> {
        let wanted = normalize_plugin_path(path);
        self.plugins.iter().find(|p| p.matches_path(&wanted))
    }

    /// Find a plugin entry by its path, mutably
    pub fn plugin_mut(&mut self, path: &str) -> Option<&mut PluginEntry> {
        let wanted = normalize_plugin_path(path);
        self.plugins.iter_mut().find(|p| p.matches_path(&wanted))
    }
}

/// Organization identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Short code used in generated namespaces
    #[serde(default)]
    pub code: String,

    /// Keys not understood by this version
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Organization {
    /// Create an organization identity
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            extra: Map::new(),
        }
    }
}

/// Platform block of the descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Semantic version, empty/absent or "custom" for manual management
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Keys not understood by this version
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlatformConfig {
    /// Classify the configured version string
    pub fn requested_version(&self) -> RequestedVersion {
        let raw = match self.version.as_deref().map(str::trim) {
            None | Some("") => return RequestedVersion::Manual,
            Some(v) if v.eq_ignore_ascii_case(CUSTOM_VERSION) => return RequestedVersion::Manual,
            Some(v) => v,
        };

        match Version::parse(raw) {
            Ok(version) => RequestedVersion::Pinned(version),
            Err(e) => RequestedVersion::Invalid {
                raw: raw.to_string(),
                reason: e.to_string(),
            },
        }
    }
}

/// What the descriptor asks for regarding the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedVersion {
    /// Platform lifecycle is managed by hand; nothing to compare
    Manual,

    /// A specific version is pinned
    Pinned(Version),

    /// The version string does not parse
    Invalid { raw: String, reason: String },
}

/// A plugin working copy declared in the descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEntry {
    /// Relative path from the environment root (unique key)
    pub path: String,

    /// Git remote to clone from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Branch the working copy must be on (opt-in)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Keys not understood by this version
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PluginEntry {
    /// Create a plugin entry
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: normalize_plugin_path(&path.into()),
            url: None,
            branch: None,
            extra: Map::new(),
        }
    }

    /// Set the remote URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the required branch
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Remote URL, treating an empty string as absent
    pub fn remote_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Whether this entry's path, normalized, equals `normalized`
    pub fn matches_path(&self, normalized: &str) -> bool {
        normalize_plugin_path(&self.path) == normalized
    }

    /// Required branch, treating an empty string as absent
    pub fn required_branch(&self) -> Option<&str> {
        self.branch.as_deref().map(str::trim).filter(|b| !b.is_empty())
    }
}

/// Normalize a plugin path to forward slashes without a leading `./` or a
/// trailing separator
pub fn normalize_plugin_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut rest = path.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest.trim_end_matches('/').to_string()
}

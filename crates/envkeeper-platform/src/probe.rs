//! Installed version probe
//!
//! Asks the platform executable for its version by running it with the
//! configured version flag and scanning the output for a semantic version.

use crate::error::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use semver::Version;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Pre-compiled regex for extracting a version from command output
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"v?(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?)").expect("version regex is valid")
});

/// Source of the version an installed platform reports
#[async_trait]
pub trait VersionProbe: Send + Sync {
    /// Version reported by the executable at `binary`, `None` when unreadable
    async fn installed_version(&self, binary: &Path) -> Result<Option<Version>>;
}

/// Runs `<binary> <version flag>` and parses its output
#[derive(Debug, Clone)]
pub struct CommandVersionProbe {
    version_flag: String,
    timeout: Duration,
}

impl CommandVersionProbe {
    /// Create a probe passing `version_flag` (split on whitespace)
    pub fn new(version_flag: impl Into<String>) -> Self {
        Self {
            version_flag: version_flag.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Override the time the executable is given to answer
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl VersionProbe for CommandVersionProbe {
    async fn installed_version(&self, binary: &Path) -> Result<Option<Version>> {
        let mut cmd = Command::new(binary);
        cmd.args(self.version_flag.split_whitespace());
        cmd.kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                Error::version_probe(
                    binary.display().to_string(),
                    format!("no answer within {}s", self.timeout.as_secs()),
                )
            })?
            .map_err(|e| Error::version_probe(binary.display().to_string(), e.to_string()))?;

        // Try stdout first, then stderr
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr)
        } else {
            String::from_utf8_lossy(&output.stdout)
        };

        let version = parse_version(&text);
        debug!("{:?} reports version {:?}", binary, version);
        Ok(version)
    }
}

/// Extract the first semantic version from tool output
///
/// Handles the usual shapes: `"2.1.7"`, `"v2.1.7"`, `"Platform 2.1.7 (build 88)"`.
pub fn parse_version(text: &str) -> Option<Version> {
    VERSION_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| Version::parse(m.as_str()).ok())
}

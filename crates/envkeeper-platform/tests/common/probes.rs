//! Version probes for tests

use async_trait::async_trait;
use envkeeper_platform::{Result, VersionProbe};
use semver::Version;
use std::path::Path;

/// Reports a fixed version without running anything
pub struct StaticVersionProbe(pub Option<Version>);

impl StaticVersionProbe {
    pub fn boxed(version: &str) -> Box<dyn VersionProbe> {
        Box::new(Self(Some(Version::parse(version).expect("valid test version"))))
    }

    pub fn unreadable() -> Box<dyn VersionProbe> {
        Box::new(Self(None))
    }
}

#[async_trait]
impl VersionProbe for StaticVersionProbe {
    async fn installed_version(&self, _binary: &Path) -> Result<Option<Version>> {
        Ok(self.0.clone())
    }
}

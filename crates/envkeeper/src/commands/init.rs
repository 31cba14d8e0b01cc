//! Init command

use anyhow::{Context, Result};
use camino::Utf8Path;
use envkeeper_core::types::{EnvironmentDescriptor, Organization};
use envkeeper_core::DescriptorFile;

use crate::cli::InitArgs;
use crate::commands::target_dir;
use crate::output;

pub fn run(args: InitArgs, dir: Option<&Utf8Path>) -> Result<()> {
    let dir = target_dir(dir)?;

    let descriptor = EnvironmentDescriptor::new(
        Organization::new(args.name, args.code),
        args.platform_version,
    );

    let file = DescriptorFile::create(&dir, descriptor, args.force)
        .with_context(|| format!("Failed to initialize environment in {}", dir))?;

    output::success(&format!("Created {}", file.path));
    if let Some(version) = file
        .descriptor
        .platform
        .as_ref()
        .and_then(|p| p.version.as_deref())
    {
        output::kv("Platform", version);
    } else {
        output::kv("Platform", "managed manually");
    }
    output::info("Run 'envkeeper update' to install the platform and plugins");

    Ok(())
}

//! CLI command implementations

pub mod clean;
pub mod init;
pub mod plugin;
pub mod status;
pub mod update;
pub mod version;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use envkeeper_core::types::RuntimeConfig;
use envkeeper_core::HierarchicalConfigLoader;
use envkeeper_environment::Environment;
use tracing::debug;

/// Load runtime configuration from ~/.envkeeper and ENVKEEPER_* variables
pub(crate) fn load_runtime_config() -> Result<RuntimeConfig> {
    let loader = HierarchicalConfigLoader::new()?;
    loader
        .load_runtime_config()
        .with_context(|| format!("Failed to load runtime configuration from {}", loader.config_dir()))
}

/// Open the environment in `dir`, or the nearest one above the current directory
pub(crate) fn open_environment(dir: Option<&Utf8Path>) -> Result<Environment> {
    let config = load_runtime_config()?;
    debug!("Runtime config: {:?}", config);
    let env = Environment::open(dir, config).context("Failed to open environment")?;
    Ok(env)
}

/// Directory `init` writes into
pub(crate) fn target_dir(dir: Option<&Utf8Path>) -> Result<Utf8PathBuf> {
    match dir {
        Some(dir) => Ok(dir.to_owned()),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            Utf8PathBuf::from_path_buf(cwd)
                .map_err(|p| anyhow::anyhow!("Current directory is not valid UTF-8: {}", p.display()))
        }
    }
}

//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// envkeeper - Keep a development environment in line with environment.json
#[derive(Parser, Debug)]
#[command(name = "envkeeper")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Environment directory (default: search upward for environment.json)
    #[arg(short, long, global = true, env = "ENVKEEPER_DIR")]
    pub dir: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version(VersionArgs),

    /// Create environment.json in the environment directory
    Init(InitArgs),

    /// Report drift between the descriptor and the environment
    Status(StatusArgs),

    /// Bring the platform and plugins in line with the descriptor
    Update(UpdateArgs),

    /// Remove the files recorded by the last platform install
    Clean(CleanArgs),

    /// Plugin declarations
    #[command(subcommand)]
    Plugin(PluginCommands),
}

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Organization display name
    #[arg(long)]
    pub name: String,

    /// Organization short code
    #[arg(long)]
    pub code: String,

    /// Platform version to pin (omit or "custom" to manage by hand)
    #[arg(long = "platform-version", value_name = "VERSION")]
    pub platform_version: Option<String>,

    /// Overwrite an existing descriptor
    #[arg(short, long)]
    pub force: bool,
}

// Status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Update command
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Show what would change without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

// Clean command
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Show what would be removed without removing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

// Plugin commands
#[derive(Subcommand, Debug)]
pub enum PluginCommands {
    /// Declare a plugin
    Add(PluginAddArgs),

    /// Change the url or branch of a declared plugin
    Set(PluginSetArgs),

    /// Undeclare a plugin
    Remove(PluginRemoveArgs),

    /// List declared plugins
    List(PluginListArgs),
}

#[derive(Args, Debug)]
pub struct PluginAddArgs {
    /// Path of the working copy, relative to the environment root
    pub path: String,

    /// Git remote to clone from
    #[arg(long)]
    pub url: Option<String>,

    /// Branch the working copy must be on
    #[arg(long)]
    pub branch: Option<String>,
}

#[derive(Args, Debug)]
pub struct PluginSetArgs {
    /// Path of the declared plugin
    pub path: String,

    /// New git remote
    #[arg(long)]
    pub url: Option<String>,

    /// New required branch
    #[arg(long, conflicts_with = "clear_branch")]
    pub branch: Option<String>,

    /// Drop the branch requirement
    #[arg(long)]
    pub clear_branch: bool,
}

#[derive(Args, Debug)]
pub struct PluginRemoveArgs {
    /// Path of the declared plugin
    pub path: String,

    /// Also delete the working copy
    #[arg(long)]
    pub delete: bool,

    /// Delete the working copy even with uncommitted changes
    #[arg(short, long, requires = "delete")]
    pub force: bool,

    /// Show what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct PluginListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_dir_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["envkeeper", "status", "--dir", "/tmp/env", "--json"])
            .unwrap();
        assert_eq!(cli.dir.as_deref(), Some(camino::Utf8Path::new("/tmp/env")));
        assert!(matches!(cli.command, Commands::Status(StatusArgs { json: true })));
    }

    #[test]
    fn test_plugin_set_branch_conflicts_with_clear() {
        let result = Cli::try_parse_from([
            "envkeeper",
            "plugin",
            "set",
            "plugins/blog",
            "--branch",
            "main",
            "--clear-branch",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_plugin_remove_force_requires_delete() {
        let result =
            Cli::try_parse_from(["envkeeper", "plugin", "remove", "plugins/blog", "--force"]);
        assert!(result.is_err());
    }
}

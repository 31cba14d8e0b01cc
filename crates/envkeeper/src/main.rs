//! envkeeper CLI - Declarative development environments
//!
//! This is the main entry point for the envkeeper command-line interface.

mod cli;
mod commands;
mod output;
mod version;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // Parse CLI args
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.quiet);

    let dir = cli.dir.as_deref();

    // Run command
    match cli.command {
        Commands::Version(args) => commands::version::run(args),
        Commands::Init(args) => commands::init::run(args, dir),
        Commands::Status(args) => commands::status::run(args, dir).await,
        Commands::Update(args) => commands::update::run(args, dir).await,
        Commands::Clean(args) => commands::clean::run(args, dir),
        Commands::Plugin(args) => commands::plugin::run(args, dir).await,
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

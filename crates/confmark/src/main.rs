//! confmark CLI - Confluence pages to Markdown and back.
//!
//! Provides commands for:
//! - `export`: Save Confluence pages (or a whole space) as Markdown
//! - `publish`: Create or update a Confluence page from Markdown
//! - `convert`: Offline conversion between document trees, Markdown and storage format

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertCommand, ExportArgs, PublishArgs};
use output::Output;

/// confmark - Confluence to Markdown and back.
#[derive(Parser)]
#[command(name = "confmark", version, about)]
struct Cli {
    /// Path to configuration file (default: auto-discover confmark.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable info-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export Confluence pages to Markdown files.
    Export(ExportArgs),
    /// Publish a Markdown file to Confluence.
    Publish(PublishArgs),
    /// Offline format conversion.
    #[command(subcommand)]
    Convert(ConvertCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Export(args) => args.execute(config),
        Commands::Publish(args) => args.execute(config),
        Commands::Convert(cmd) => cmd.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

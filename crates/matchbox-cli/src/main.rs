//! Matchbox CLI - Browse a Dropbox account from the terminal
//!
//! Provides commands for:
//! - Signing in and out of Dropbox
//! - Listing folders page by page, resuming from the local cache
//! - Opening folders and image thumbnails by row
//! - Inspecting the configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use matchbox_core::config::Config;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod output;

use commands::{
    auth::AuthCommand,
    browse::{LsCommand, OpenCommand},
    config::ConfigCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "matchbox", version, about = "Browse a Dropbox account")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in to or out of Dropbox
    #[command(subcommand)]
    Auth(AuthCommand),
    /// List a folder
    Ls(LsCommand),
    /// Act on a row of a folder listing
    Open(OpenCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);

    // Setup tracing; stdout is reserved for command output
    let filter = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Auth(cmd) => cmd.execute(&config, format).await,
        Commands::Ls(cmd) => cmd.execute(&config, format).await,
        Commands::Open(cmd) => cmd.execute(&config, format).await,
        Commands::Config(cmd) => cmd.execute(&config_path, format).await,
    }
}

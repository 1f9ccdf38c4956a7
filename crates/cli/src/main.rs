//! OSW CLI - Main Entry Point
//!
//! Drives an OpenSemanticLab wiki through WebDriver: logs in, fills
//! JSON-editor forms from YAML workflows and converts schema paths.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use osw_common::OswConfig;

mod commands;
mod output;

use commands::{config, login, path, run};

/// OSW CLI - OpenSemanticLab browser automation
#[derive(Parser)]
#[command(name = "osw")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// TOML config file; environment variables override its values
    #[arg(long, global = true, env = "OSW_CONFIG")]
    config: Option<PathBuf>,

    /// Dotenv file to load before reading the environment
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective configuration
    Config,

    /// Convert between schema paths and form field names
    #[command(subcommand)]
    Path(path::PathCommands),

    /// Log in to the wiki
    Login(login::LoginArgs),

    /// Run YAML workflows
    Run(run::RunArgs),

    /// Create an ELN entry with inline orderer and actionee
    ElnEntry(run::ElnEntryArgs),

    /// Show version information
    Version,
}

fn load_config(cli: &Cli) -> anyhow::Result<OswConfig> {
    if let Some(env_file) = &cli.env_file {
        OswConfig::load_env_file(env_file)?;
    }
    let config = match &cli.config {
        Some(path) => OswConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => OswConfig::from_env()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Path(cmd) => path::execute(cmd, cli.format)?,
        Commands::Version => {
            println!("OSW CLI v{}", osw_common::VERSION);
            println!("OpenSemanticLab browser automation over WebDriver");
        }
        Commands::Config => config::execute(&load_config(&cli)?, cli.format)?,
        Commands::Login(args) => {
            let config = load_config(&cli)?;
            login::execute(args, config).await?
        }
        Commands::Run(args) => {
            let config = load_config(&cli)?;
            if !run::execute(args, config, cli.format).await? {
                std::process::exit(1);
            }
        }
        Commands::ElnEntry(args) => {
            let config = load_config(&cli)?;
            if !run::execute_eln_entry(args, config, cli.format).await? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

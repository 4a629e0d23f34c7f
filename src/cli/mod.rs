//! CLI entry point for modelrelay.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// modelrelay CLI
#[derive(Parser, Debug)]
#[command(
    name = "modelrelay",
    version,
    about = "Resolve logical model names across providers"
)]
pub struct Cli {
    /// Config file (defaults to $MODELRELAY_CONFIG, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available logical models
    List,
    /// Show each logical model with its raw variants
    Catalog(CatalogArgs),
    /// Send a prompt to a logical model
    Chat(ChatArgs),
    /// Inspect or extend the blacklist
    Blacklist(BlacklistArgs),
    /// Inspect or reset the failure record
    Failures(FailuresArgs),
}

/// Arguments for the `catalog` subcommand.
#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Print the catalog as a JSON object of logical name -> raw variants
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `chat` subcommand.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Logical model name (see `modelrelay list`)
    #[arg(short, long)]
    pub model: String,

    /// System prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// User prompt
    pub prompt: String,
}

/// Arguments for the `blacklist` subcommand group.
#[derive(Parser, Debug)]
pub struct BlacklistArgs {
    #[command(subcommand)]
    pub command: BlacklistCommands,
}

#[derive(Subcommand, Debug)]
pub enum BlacklistCommands {
    /// Print the current blacklist
    Show,
    /// Exclude a logical model from the catalog
    Model { name: String },
    /// Exclude a provider from every resolution
    Provider { name: String },
    /// Exclude one raw variant on one provider
    Pair { variant: String, provider: String },
}

/// Arguments for the `failures` subcommand group.
#[derive(Parser, Debug)]
pub struct FailuresArgs {
    #[command(subcommand)]
    pub command: FailuresCommands,
}

#[derive(Subcommand, Debug)]
pub enum FailuresCommands {
    /// Print recorded failures
    Show,
    /// Forget every recorded failure
    Clear,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

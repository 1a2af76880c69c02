//! CLI module for Callsync
//!
//! # Commands
//!
//! - `serve` - Start the Callsync server
//! - `sync` - Run one reconciliation pass and print the claimed calls
//! - `relink` - Run the relink maintenance pass and print the counts
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions

pub mod completions;
pub mod config;
pub mod output;
pub mod serve;
pub mod sync;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Callsync - call-record reconciliation service
#[derive(Parser, Debug)]
#[command(
    name = "callsync",
    version,
    about = "Keeps a local call ownership index in sync with an external call-center API"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the Callsync server
    Serve(ServeArgs),
    /// Run one reconciliation pass and list claimed calls
    Sync(SyncArgs),
    /// Relink unowned records and index missing calls
    Relink(RelinkArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "callsync.toml")]
    pub config: PathBuf,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Log level (overrides config)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "callsync.toml")]
    pub config: PathBuf,

    /// Output as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RelinkArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "callsync.toml")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a starter configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output path
    #[arg(short, long, default_value = "callsync.toml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

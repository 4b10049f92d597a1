//! CLI Command Definitions
//!
//! Command-line surface of the mintwatch binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mintwatch - Telegram token-mention watcher and notifier
#[derive(Parser, Debug)]
#[command(
    name = "mintwatch",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Telegram token-mention watcher and notifier",
    long_about = "Mintwatch watches group chats for token addresses, enriches each hit \
                  from on-chain and market data sources, and posts throttled \
                  notifications to the configured destination chats."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start watching chats
    Run(RunCmd),

    /// Classify a text snippet without side effects
    Scan(ScanCmd),

    /// Aggregate one address and print the formatted notification
    Lookup(LookupCmd),
}

/// Start the watch loop
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Override RPC URL
    #[arg(long, value_name = "URL")]
    pub rpc_url: Option<String>,
}

/// Classify a text snippet
#[derive(Parser, Debug)]
pub struct ScanCmd {
    /// Message text to scan
    pub text: String,
}

/// Aggregate one address
#[derive(Parser, Debug)]
pub struct LookupCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Token address to look up
    pub address: String,
}

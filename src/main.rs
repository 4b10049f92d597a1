//! Mintwatch - Telegram Token-Mention Watcher
//!
//! Watches group chats for token addresses, enriches each hit, and posts
//! throttled notifications.

mod domain;
mod ports;
mod adapters;
mod config;
mod application;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Duration as ChronoDuration;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use crate::adapters::cli::{CliApp, Command, LookupCmd, RunCmd, ScanCmd};
use crate::adapters::{
    ContentClient, HttpRenderer, PoolsClient, RegistryClient, RegistryConfig, ScraperClient,
    TelegramNotifier, TelegramUpdatesSource,
};
use crate::application::{MetadataAggregator, Watcher};
use crate::config::{load_config, Config};
use crate::domain::{
    format_record, AddressScanner, NotificationGate, PostingLog, Roster,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in config.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    init_logging(app.verbose, app.debug)?;

    match app.command {
        Command::Run(cmd) => run_command(cmd).await,
        Command::Scan(cmd) => scan_command(cmd),
        Command::Lookup(cmd) => lookup_command(cmd).await,
    }
}

fn init_logging(verbose: bool, debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };

    fmt().with_env_filter(filter).init();
    Ok(())
}

/// Build the aggregator from config, honoring an optional RPC override
fn build_aggregator(config: &Config, rpc_override: Option<String>) -> Result<MetadataAggregator> {
    let rpc_url = rpc_override.unwrap_or_else(|| config.solana.get_rpc_url());
    let source_timeout = Duration::from_secs(config.watcher.source_timeout_secs);

    let registry = RegistryClient::with_config(RegistryConfig {
        rpc_url,
        ..Default::default()
    })
    .context("Failed to create registry client")?;
    let content =
        ContentClient::new(source_timeout).context("Failed to create content client")?;
    let renderer =
        HttpRenderer::new(source_timeout).context("Failed to create page renderer")?;
    let scraper = ScraperClient::new(Arc::new(renderer));
    let pools = PoolsClient::new(source_timeout).context("Failed to create pools client")?;

    Ok(MetadataAggregator::new(
        Arc::new(registry),
        Arc::new(content),
        Arc::new(scraper),
        Arc::new(pools),
    )
    .with_source_timeout(source_timeout))
}

async fn run_command(cmd: RunCmd) -> Result<()> {
    tracing::info!("Starting mintwatch...");

    let config = load_config(&cmd.config).context("Failed to load configuration")?;

    let aggregator = build_aggregator(&config, cmd.rpc_url)?;

    let token = config.telegram.get_bot_token();
    let transport =
        TelegramUpdatesSource::new(&token).context("Failed to create Telegram updates source")?;
    let notifier = TelegramNotifier::new(&token, config.telegram.notify_chat_ids.clone())
        .context("Failed to create Telegram notifier")?;

    let log = PostingLog::new(
        config.storage.posting_log_path(),
        ChronoDuration::seconds(config.watcher.per_address_cooldown_secs),
    );
    let gate = NotificationGate::new(log).with_cooldowns(
        ChronoDuration::seconds(config.watcher.per_address_cooldown_secs),
        ChronoDuration::seconds(config.watcher.global_cooldown_secs),
    );
    let roster = Roster::new(config.storage.roster_path());

    let mut watcher = Watcher::new(
        AddressScanner::new(),
        aggregator,
        gate,
        roster,
        Arc::new(transport),
        Arc::new(notifier),
    );
    if let Some(own_chat_id) = config.telegram.get_own_chat_id() {
        watcher = watcher.with_excluded_chat(own_chat_id);
    }

    Arc::new(watcher).run().await?;
    tracing::info!("Mintwatch stopped");
    Ok(())
}

fn scan_command(cmd: ScanCmd) -> Result<()> {
    let scanner = AddressScanner::new();
    match scanner.scan(&cmd.text) {
        Some(candidate) => println!("{}: {}", candidate.chain, candidate.address),
        None => println!("no address found"),
    }
    Ok(())
}

async fn lookup_command(cmd: LookupCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let aggregator = build_aggregator(&config, None)?;

    let scanner = AddressScanner::new();
    let candidate = scanner
        .scan(&cmd.address)
        .context("Input is not a recognizable token address")?;

    match aggregator.aggregate(&candidate.address, candidate.chain).await {
        Some(record) => {
            let payload = format_record(&record);
            println!("{}", payload.text);
            if let Some(image) = payload.image {
                println!("image: {}", image);
            }
        }
        None => println!("{} is not a known token", candidate.address),
    }
    Ok(())
}

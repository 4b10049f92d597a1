//! Adapters Layer - External System Implementations
//!
//! Implementations of the port traits:
//! - Registry: on-chain asset lookup over JSON-RPC
//! - Content: content-addressed metadata over gateway HTTP
//! - Market: venue page scraper and pools REST fallback
//! - Telegram: inbound updates source and outbound notifier
//! - CLI: command-line surface
//! - HttpRenderer: plain-HTTP PageRenderer implementation

pub mod cli;
pub mod content;
pub mod http_renderer;
pub mod market;
pub mod registry;
pub mod telegram;

pub use cli::CliApp;
pub use content::ContentClient;
pub use http_renderer::HttpRenderer;
pub use market::{PoolsClient, ScraperClient};
pub use registry::{RegistryClient, RegistryConfig};
pub use telegram::{TelegramNotifier, TelegramUpdatesSource};

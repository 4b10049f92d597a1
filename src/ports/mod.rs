//! Ports Layer - Trait definitions for external dependencies
//!
//! Interfaces the adapters implement, following hexagonal architecture:
//! - Metadata sources (registry, content metadata, venue scrape, pools)
//! - Chat transport (inbound messages)
//! - Notifier (outbound delivery)
//! - Page renderer (browser boundary for the scraper)

pub mod chat;
pub mod mocks;
pub mod notify;
pub mod renderer;
pub mod sources;

pub use chat::{ChatError, ChatTransport, InboundMessage};
pub use notify::{Notifier, NotifyError};
pub use renderer::{PageRenderer, RenderError};
pub use sources::{
    AssetInfo, AssetRegistry, ContentError, ContentFields, ContentMetadataFetcher, MarketPools,
    MarketScraper, PoolsError, PoolStats, RegistryError, ScrapeError, ScrapeOutcome,
};

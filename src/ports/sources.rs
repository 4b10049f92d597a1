//! Metadata Source Ports
//!
//! Trait seams for the four enrichment sources. Each call is independent
//! and may fail on its own; the aggregator owns the precedence and
//! fallback rules between them.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::record::{SocialLinks, TopHolder};

/// On-chain asset info as returned by the registry lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetInfo {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub owner: Option<String>,
    /// Raw integer supply, not yet divided by 10^decimals
    pub raw_supply: Option<u128>,
    pub decimals: Option<u8>,
    /// Pointer to the richer off-chain JSON metadata
    pub json_uri: Option<String>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("RPC request failed: {0}")]
    RpcError(String),

    #[error("Failed to parse registry response: {0}")]
    ParseError(String),
}

/// On-chain registry: asset lookup and holder ranking
#[async_trait]
pub trait AssetRegistry: Send + Sync {
    /// `Ok(None)` is the definitive "not a known asset" result
    async fn get_asset(&self, address: &str) -> Result<Option<AssetInfo>, RegistryError>;

    /// Holder accounts ranked descending by balance
    async fn get_largest_holders(&self, address: &str) -> Result<Vec<TopHolder>, RegistryError>;
}

/// Auxiliary fields from the content-addressed JSON metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentFields {
    pub image: Option<String>,
    pub links: SocialLinks,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Content fetch failed: {0}")]
    FetchError(String),

    #[error("Failed to parse content metadata: {0}")]
    ParseError(String),
}

/// Best-effort fetcher for the json_uri pointed at by the registry
#[async_trait]
pub trait ContentMetadataFetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<ContentFields, ContentError>;
}

/// Result of scraping the market venue page
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    /// Figures read off the rendered page
    Figures {
        /// Percentage string as displayed, e.g. "42%"
        bonding_curve_progress: String,
        market_cap: f64,
    },
    /// Bonding curve read as complete; the page is stale and the pools
    /// REST fallback is authoritative
    Deferred,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Page render failed: {0}")]
    RenderFailed(String),

    #[error("Required field missing from page: {0}")]
    MissingField(String),
}

/// Browser-rendered market venue scraper
#[async_trait]
pub trait MarketScraper: Send + Sync {
    async fn scrape(&self, listing_url: &str, address: &str) -> Result<ScrapeOutcome, ScrapeError>;
}

/// Figures from the first listed pool of the REST fallback
#[derive(Debug, Clone, PartialEq)]
pub struct PoolStats {
    pub one_hour_volume: f64,
    /// Fully-diluted market cap
    pub market_cap: f64,
    /// Reserve liquidity in USD
    pub liquidity: f64,
}

#[derive(Debug, Error)]
pub enum PoolsError {
    #[error("Pools request failed: {0}")]
    RequestError(String),

    #[error("No pools listed for address: {0}")]
    NoPools(String),

    #[error("Failed to parse pools response: {0}")]
    ParseError(String),
}

/// Public pools REST endpoint, used when the scrape defers or fails
#[async_trait]
pub trait MarketPools: Send + Sync {
    async fn fetch_pool_stats(&self, address: &str) -> Result<PoolStats, PoolsError>;
}

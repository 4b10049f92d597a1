//! Metadata Aggregator
//!
//! Orchestrates the four source clients for one detected address and
//! merges their partial results into a single TokenRecord. The registry
//! lookup is authoritative: no asset means no record. Everything after it
//! is best-effort and runs concurrently under per-call timeouts; the
//! market snapshot comes from the venue scrape or, when that defers or
//! fails, from the pools REST fallback.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::time::timeout;

use crate::domain::record::{ChainKind, MarketSnapshot, TokenRecord, TopHolder};
use crate::ports::sources::{
    AssetRegistry, ContentMetadataFetcher, MarketPools, MarketScraper, ScrapeOutcome,
};

/// Listing URL template for the market venue
const LISTING_URL_BASE: &str = "https://pump.fun";
/// Holders kept on the record
const TOP_HOLDER_CAP: usize = 5;
/// Default per-source-call timeout
const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 20;

pub struct MetadataAggregator {
    registry: Arc<dyn AssetRegistry>,
    content: Arc<dyn ContentMetadataFetcher>,
    scraper: Arc<dyn MarketScraper>,
    pools: Arc<dyn MarketPools>,
    source_timeout: Duration,
}

impl MetadataAggregator {
    pub fn new(
        registry: Arc<dyn AssetRegistry>,
        content: Arc<dyn ContentMetadataFetcher>,
        scraper: Arc<dyn MarketScraper>,
        pools: Arc<dyn MarketPools>,
    ) -> Self {
        Self {
            registry,
            content,
            scraper,
            pools,
            source_timeout: Duration::from_secs(DEFAULT_SOURCE_TIMEOUT_SECS),
        }
    }

    pub fn with_source_timeout(mut self, source_timeout: Duration) -> Self {
        self.source_timeout = source_timeout;
        self
    }

    /// Deterministic market listing URL for an address
    pub fn listing_url(address: &str) -> String {
        format!("{}/{}", LISTING_URL_BASE, address)
    }

    /// Build the record for one address. `None` means the address is not
    /// a known token and the caller must not notify. Never panics and
    /// never propagates a source error: anything unexpected is logged and
    /// collapses to `None`.
    pub async fn aggregate(&self, address: &str, chain: ChainKind) -> Option<TokenRecord> {
        if chain != ChainKind::Solana {
            // No enrichment sources exist for other chains
            return Some(TokenRecord::bare(address, chain));
        }

        match self.aggregate_solana(address).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!("Aggregation failed for {}: {}", address, e);
                None
            }
        }
    }

    async fn aggregate_solana(&self, address: &str) -> Result<Option<TokenRecord>, String> {
        let asset = timeout(self.source_timeout, self.registry.get_asset(address))
            .await
            .map_err(|_| "registry lookup timed out".to_string())?
            .map_err(|e| e.to_string())?;

        let Some(asset) = asset else {
            tracing::info!("{} is not a known asset, skipping", address);
            return Ok(None);
        };

        let mut record = TokenRecord::bare(address, ChainKind::Solana);
        record.name = asset.name;
        record.symbol = asset.symbol;
        record.owner = asset.owner;
        record.decimals = asset.decimals;
        record.supply = asset
            .raw_supply
            .and_then(|raw| scale_supply(raw, asset.decimals));
        record.listing_url = Some(Self::listing_url(address));

        let (content, holders, market) = tokio::join!(
            self.fetch_content(asset.json_uri.as_deref()),
            self.fetch_holders(address),
            self.fetch_market(address),
        );

        if let Some(content) = content {
            record.image = content.image;
            record.links = content.links;
        }
        record.top_holders = holders;
        record.market = market;

        Ok(Some(record))
    }

    /// Best-effort content metadata; failure leaves the fields absent
    async fn fetch_content(
        &self,
        json_uri: Option<&str>,
    ) -> Option<crate::ports::sources::ContentFields> {
        let uri = json_uri?;
        match timeout(self.source_timeout, self.content.fetch(uri)).await {
            Ok(Ok(fields)) => Some(fields),
            Ok(Err(e)) => {
                tracing::debug!("Content metadata fetch failed for {}: {}", uri, e);
                None
            }
            Err(_) => {
                tracing::debug!("Content metadata fetch timed out for {}", uri);
                None
            }
        }
    }

    /// Top holders ranked descending by balance, capped at five
    async fn fetch_holders(&self, address: &str) -> Vec<TopHolder> {
        let holders = match timeout(self.source_timeout, self.registry.get_largest_holders(address))
            .await
        {
            Ok(Ok(holders)) => holders,
            Ok(Err(e)) => {
                tracing::debug!("Holder lookup failed for {}: {}", address, e);
                return Vec::new();
            }
            Err(_) => {
                tracing::debug!("Holder lookup timed out for {}", address);
                return Vec::new();
            }
        };

        let mut holders = holders;
        holders.sort_by(|a, b| b.balance.total_cmp(&a.balance));
        holders.truncate(TOP_HOLDER_CAP);
        holders
    }

    /// Venue scrape with REST fallback; both failing leaves the snapshot
    /// empty, which is not a pipeline failure
    async fn fetch_market(&self, address: &str) -> MarketSnapshot {
        let listing_url = Self::listing_url(address);

        match timeout(self.source_timeout, self.scraper.scrape(&listing_url, address)).await {
            Ok(Ok(ScrapeOutcome::Figures {
                bonding_curve_progress,
                market_cap,
            })) => {
                return MarketSnapshot {
                    bonding_curve_progress: Some(bonding_curve_progress),
                    market_cap: Some(market_cap),
                    one_hour_volume: None,
                    liquidity: None,
                };
            }
            Ok(Ok(ScrapeOutcome::Deferred)) => {
                tracing::debug!("Scrape deferred for {}, using pools fallback", address);
            }
            Ok(Err(e)) => {
                tracing::debug!("Scrape failed for {}: {}, using pools fallback", address, e);
            }
            Err(_) => {
                tracing::debug!("Scrape timed out for {}, using pools fallback", address);
            }
        }

        match timeout(self.source_timeout, self.pools.fetch_pool_stats(address)).await {
            Ok(Ok(stats)) => MarketSnapshot {
                bonding_curve_progress: None,
                market_cap: Some(stats.market_cap),
                one_hour_volume: Some(stats.one_hour_volume),
                liquidity: Some(stats.liquidity),
            },
            Ok(Err(e)) => {
                tracing::debug!("Pools fallback failed for {}: {}", address, e);
                MarketSnapshot::default()
            }
            Err(_) => {
                tracing::debug!("Pools fallback timed out for {}", address);
                MarketSnapshot::default()
            }
        }
    }
}

/// Human-scale a raw integer supply: divide by 10^decimals when known,
/// keep unscaled otherwise
fn scale_supply(raw: u128, decimals: Option<u8>) -> Option<Decimal> {
    let raw = i128::try_from(raw).ok()?;
    let scale = decimals.map(u32::from).unwrap_or(0);
    Decimal::try_from_i128_with_scale(raw, scale).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::SocialLinks;
    use crate::ports::mocks::{MockContentFetcher, MockPools, MockRegistry, MockScraper};
    use crate::ports::sources::{AssetInfo, ContentFields, PoolStats};
    use rust_decimal_macros::dec;

    const MINT: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    fn abc_asset() -> AssetInfo {
        AssetInfo {
            name: Some("ABC Token".to_string()),
            symbol: Some("ABC".to_string()),
            owner: Some("Own1".to_string()),
            raw_supply: Some(1_000_000_000),
            decimals: Some(9),
            json_uri: None,
        }
    }

    fn aggregator_with(
        registry: MockRegistry,
        content: MockContentFetcher,
        scraper: MockScraper,
        pools: MockPools,
    ) -> MetadataAggregator {
        MetadataAggregator::new(
            Arc::new(registry),
            Arc::new(content),
            Arc::new(scraper),
            Arc::new(pools),
        )
    }

    #[tokio::test]
    async fn test_evm_address_gets_bare_record() {
        let registry = Arc::new(MockRegistry::new());
        let aggregator = MetadataAggregator::new(
            registry.clone(),
            Arc::new(MockContentFetcher::new()),
            Arc::new(MockScraper::new()),
            Arc::new(MockPools::new()),
        );

        let record = aggregator
            .aggregate("0xdAC17F958D2ee523a2206206994597C13D831ec7", ChainKind::Evm)
            .await
            .unwrap();

        assert_eq!(record.chain, ChainKind::Evm);
        assert!(record.name.is_none());
        assert!(record.listing_url.is_none());
        // No source was touched
        assert!(registry.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_asset_returns_none() {
        let aggregator = aggregator_with(
            MockRegistry::new(),
            MockContentFetcher::new(),
            MockScraper::new(),
            MockPools::new(),
        );

        assert!(aggregator.aggregate(MINT, ChainKind::Solana).await.is_none());
    }

    #[tokio::test]
    async fn test_registry_failure_collapses_to_none() {
        let aggregator = aggregator_with(
            MockRegistry::new().failing(),
            MockContentFetcher::new(),
            MockScraper::new(),
            MockPools::new(),
        );

        assert!(aggregator.aggregate(MINT, ChainKind::Solana).await.is_none());
    }

    #[tokio::test]
    async fn test_supply_is_scaled_by_decimals() {
        let aggregator = aggregator_with(
            MockRegistry::new().with_asset(abc_asset()),
            MockContentFetcher::new(),
            MockScraper::new()
                .with_outcome(ScrapeOutcome::Figures {
                    bonding_curve_progress: "42%".to_string(),
                    market_cap: 12345.0,
                }),
            MockPools::new(),
        );

        let record = aggregator.aggregate(MINT, ChainKind::Solana).await.unwrap();
        assert_eq!(record.supply.unwrap().normalize(), dec!(1));
        assert_eq!(record.decimals, Some(9));
    }

    #[tokio::test]
    async fn test_supply_unscaled_without_decimals() {
        let mut asset = abc_asset();
        asset.decimals = None;
        let aggregator = aggregator_with(
            MockRegistry::new().with_asset(asset),
            MockContentFetcher::new(),
            MockScraper::new()
                .with_outcome(ScrapeOutcome::Figures {
                    bonding_curve_progress: "42%".to_string(),
                    market_cap: 12345.0,
                }),
            MockPools::new(),
        );

        let record = aggregator.aggregate(MINT, ChainKind::Solana).await.unwrap();
        assert_eq!(record.supply, Some(dec!(1000000000)));
        assert!(record.decimals.is_none());
    }

    #[tokio::test]
    async fn test_scraped_figures_fill_snapshot() {
        let aggregator = aggregator_with(
            MockRegistry::new().with_asset(abc_asset()),
            MockContentFetcher::new(),
            MockScraper::new()
                .with_outcome(ScrapeOutcome::Figures {
                    bonding_curve_progress: "42%".to_string(),
                    market_cap: 12345.0,
                }),
            MockPools::new(),
        );

        let record = aggregator.aggregate(MINT, ChainKind::Solana).await.unwrap();
        assert_eq!(record.market.bonding_curve_progress.as_deref(), Some("42%"));
        assert_eq!(record.market.market_cap, Some(12345.0));
        assert!(record.market.one_hour_volume.is_none());
        assert_eq!(record.listing_url.unwrap(), format!("https://pump.fun/{}", MINT));
    }

    #[tokio::test]
    async fn test_deferred_scrape_uses_pools() {
        let pools = MockPools::new().with_stats(PoolStats {
            one_hour_volume: 111.0,
            market_cap: 222.0,
            liquidity: 333.0,
        });
        let aggregator = aggregator_with(
            MockRegistry::new().with_asset(abc_asset()),
            MockContentFetcher::new(),
            MockScraper::new().with_outcome(ScrapeOutcome::Deferred),
            pools,
        );

        let record = aggregator.aggregate(MINT, ChainKind::Solana).await.unwrap();
        assert!(record.market.bonding_curve_progress.is_none());
        assert_eq!(record.market.market_cap, Some(222.0));
        assert_eq!(record.market.one_hour_volume, Some(111.0));
        assert_eq!(record.market.liquidity, Some(333.0));
    }

    #[tokio::test]
    async fn test_failed_scrape_uses_pools() {
        let pools = MockPools::new().with_stats(PoolStats {
            one_hour_volume: 1.0,
            market_cap: 2.0,
            liquidity: 3.0,
        });
        let aggregator = aggregator_with(
            MockRegistry::new().with_asset(abc_asset()),
            MockContentFetcher::new(),
            MockScraper::new(), // no outcome configured -> error
            pools,
        );

        let record = aggregator.aggregate(MINT, ChainKind::Solana).await.unwrap();
        assert_eq!(record.market.market_cap, Some(2.0));
    }

    #[tokio::test]
    async fn test_both_market_paths_failing_leaves_snapshot_empty() {
        let aggregator = aggregator_with(
            MockRegistry::new().with_asset(abc_asset()),
            MockContentFetcher::new(),
            MockScraper::new(),
            MockPools::new(),
        );

        let record = aggregator.aggregate(MINT, ChainKind::Solana).await.unwrap();
        assert!(record.market.is_empty());
        // The rest of the record is intact
        assert_eq!(record.name.as_deref(), Some("ABC Token"));
    }

    #[tokio::test]
    async fn test_content_metadata_merged_when_pointer_present() {
        let mut asset = abc_asset();
        asset.json_uri = Some("https://cf-ipfs.com/ipfs/Qm123".to_string());

        let content = Arc::new(MockContentFetcher::new().with_fields(ContentFields {
            image: Some("https://ipfs.io/ipfs/QmImg".to_string()),
            links: SocialLinks {
                website: Some("https://abc.io".to_string()),
                twitter: None,
                telegram: None,
            },
        }));

        let aggregator = MetadataAggregator::new(
            Arc::new(MockRegistry::new().with_asset(asset)),
            content.clone(),
            Arc::new(MockScraper::new()),
            Arc::new(MockPools::new()),
        );

        let record = aggregator.aggregate(MINT, ChainKind::Solana).await.unwrap();
        assert_eq!(record.image.as_deref(), Some("https://ipfs.io/ipfs/QmImg"));
        assert_eq!(record.links.website.as_deref(), Some("https://abc.io"));
        assert_eq!(content.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_content_failure_is_silent() {
        let mut asset = abc_asset();
        asset.json_uri = Some("https://cf-ipfs.com/ipfs/Qm123".to_string());

        let aggregator = aggregator_with(
            MockRegistry::new().with_asset(asset),
            MockContentFetcher::new().failing(),
            MockScraper::new(),
            MockPools::new(),
        );

        let record = aggregator.aggregate(MINT, ChainKind::Solana).await.unwrap();
        assert!(record.image.is_none());
        assert!(record.links.is_empty());
        assert_eq!(record.name.as_deref(), Some("ABC Token"));
    }

    #[tokio::test]
    async fn test_holders_capped_at_five_descending() {
        let holders: Vec<TopHolder> = (0..8)
            .map(|i| TopHolder {
                address: format!("Acc{}", i),
                balance: i as f64,
            })
            .collect();

        let aggregator = aggregator_with(
            MockRegistry::new().with_asset(abc_asset()).with_holders(holders),
            MockContentFetcher::new(),
            MockScraper::new(),
            MockPools::new(),
        );

        let record = aggregator.aggregate(MINT, ChainKind::Solana).await.unwrap();
        assert_eq!(record.top_holders.len(), 5);
        assert_eq!(record.top_holders[0].balance, 7.0);
        assert_eq!(record.top_holders[4].balance, 3.0);
    }

    #[test]
    fn test_scale_supply() {
        assert_eq!(scale_supply(1_000_000_000, Some(9)).unwrap().normalize(), dec!(1));
        assert_eq!(scale_supply(1_500_000, Some(6)).unwrap().normalize(), dec!(1.5));
        assert_eq!(scale_supply(42, None), Some(dec!(42)));
    }
}

//! Hand-rolled mocks for the port traits
//!
//! Deterministic, network-free implementations used by unit and
//! integration tests: responses are configured up front with builder
//! methods and every call is recorded.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::record::{NotificationPayload, TopHolder};
use crate::ports::chat::{ChatError, ChatTransport, InboundMessage};
use crate::ports::notify::{Notifier, NotifyError};
use crate::ports::renderer::{PageRenderer, RenderError};
use crate::ports::sources::{
    AssetInfo, AssetRegistry, ContentError, ContentFields, ContentMetadataFetcher, MarketPools,
    MarketScraper, PoolsError, PoolStats, RegistryError, ScrapeError, ScrapeOutcome,
};

/// Mock registry with a fixed asset answer and holder list
#[derive(Debug, Default)]
pub struct MockRegistry {
    asset: Option<AssetInfo>,
    holders: Vec<TopHolder>,
    fail: bool,
    delay: Option<std::time::Duration>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `get_asset` with this info
    pub fn with_asset(mut self, asset: AssetInfo) -> Self {
        self.asset = Some(asset);
        self
    }

    pub fn with_holders(mut self, holders: Vec<TopHolder>) -> Self {
        self.holders = holders;
        self
    }

    /// Make every call return an error
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Hold every `get_asset` call open for this long before answering
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetRegistry for MockRegistry {
    async fn get_asset(&self, address: &str) -> Result<Option<AssetInfo>, RegistryError> {
        self.calls.lock().unwrap().push(format!("get_asset:{}", address));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(RegistryError::RpcError("mock failure".into()));
        }
        Ok(self.asset.clone())
    }

    async fn get_largest_holders(&self, address: &str) -> Result<Vec<TopHolder>, RegistryError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("get_largest_holders:{}", address));
        if self.fail {
            return Err(RegistryError::RpcError("mock failure".into()));
        }
        Ok(self.holders.clone())
    }
}

/// Mock content metadata fetcher
#[derive(Debug, Default)]
pub struct MockContentFetcher {
    fields: ContentFields,
    fail: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockContentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(mut self, fields: ContentFields) -> Self {
        self.fields = fields;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentMetadataFetcher for MockContentFetcher {
    async fn fetch(&self, uri: &str) -> Result<ContentFields, ContentError> {
        self.calls.lock().unwrap().push(uri.to_string());
        if self.fail {
            return Err(ContentError::FetchError("mock failure".into()));
        }
        Ok(self.fields.clone())
    }
}

/// Mock market scraper with a fixed outcome
#[derive(Debug, Default)]
pub struct MockScraper {
    outcome: Option<ScrapeOutcome>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockScraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(mut self, outcome: ScrapeOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketScraper for MockScraper {
    async fn scrape(&self, listing_url: &str, _address: &str) -> Result<ScrapeOutcome, ScrapeError> {
        self.calls.lock().unwrap().push(listing_url.to_string());
        self.outcome
            .clone()
            .ok_or_else(|| ScrapeError::MissingField("mock has no outcome".into()))
    }
}

/// Mock pools REST fallback
#[derive(Debug, Default)]
pub struct MockPools {
    stats: Option<PoolStats>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stats(mut self, stats: PoolStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketPools for MockPools {
    async fn fetch_pool_stats(&self, address: &str) -> Result<PoolStats, PoolsError> {
        self.calls.lock().unwrap().push(address.to_string());
        self.stats
            .clone()
            .ok_or_else(|| PoolsError::NoPools(address.to_string()))
    }
}

/// Mock notifier that records every delivered payload
#[derive(Debug, Default)]
pub struct MockNotifier {
    fail: bool,
    sent: Arc<Mutex<Vec<NotificationPayload>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(payload.clone());
        if self.fail {
            return Err(NotifyError::DeliveryFailed("mock failure".into()));
        }
        Ok(())
    }
}

/// Mock renderer answering every URL with one fixed document
#[derive(Debug, Default)]
pub struct MockRenderer {
    page: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: &str) -> Self {
        self.page = Some(page.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageRenderer for MockRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.page
            .clone()
            .ok_or_else(|| RenderError::NavigationFailed("mock has no page".into()))
    }
}

/// Mock chat transport that replays preloaded messages then closes
#[derive(Debug, Default)]
pub struct MockChatTransport {
    messages: Vec<InboundMessage>,
}

impl MockChatTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: InboundMessage) -> Self {
        self.messages.push(message);
        self
    }
}

#[async_trait]
impl ChatTransport for MockChatTransport {
    async fn subscribe(&self) -> Result<mpsc::Receiver<InboundMessage>, ChatError> {
        let (tx, rx) = mpsc::channel(self.messages.len().max(1));
        for message in &self.messages {
            tx.send(message.clone())
                .await
                .map_err(|e| ChatError::ConnectionFailed(e.to_string()))?;
        }
        Ok(rx)
    }
}

//! Chat Watcher
//!
//! The long-running message loop: subscribe to the chat transport, scan
//! each inbound group message for an address, enrich it, and notify when
//! the gate permits. Processing is strictly single-in-flight: a message
//! arriving while the pipeline is busy is dropped, not queued, so a burst
//! of repeated pastes cannot pile up duplicate notifications.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::application::aggregator::MetadataAggregator;
use crate::domain::address::AddressScanner;
use crate::domain::formatter::format_record;
use crate::domain::gate::NotificationGate;
use crate::domain::roster::{ParticipantCount, Roster};
use crate::ports::chat::{ChatTransport, InboundMessage};
use crate::ports::notify::Notifier;

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("Failed to subscribe to chat transport: {0}")]
    SubscribeFailed(String),
}

pub struct Watcher {
    scanner: AddressScanner,
    aggregator: MetadataAggregator,
    gate: NotificationGate,
    roster: Roster,
    transport: Arc<dyn ChatTransport>,
    notifier: Arc<dyn Notifier>,
    /// Chat the notifier posts into; its own messages must not re-trigger
    excluded_chat_id: Option<i64>,
    in_flight: Mutex<()>,
}

impl Watcher {
    pub fn new(
        scanner: AddressScanner,
        aggregator: MetadataAggregator,
        gate: NotificationGate,
        roster: Roster,
        transport: Arc<dyn ChatTransport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            scanner,
            aggregator,
            gate,
            roster,
            transport,
            notifier,
            excluded_chat_id: None,
            in_flight: Mutex::new(()),
        }
    }

    pub fn with_excluded_chat(mut self, chat_id: i64) -> Self {
        self.excluded_chat_id = Some(chat_id);
        self
    }

    /// Consume the transport stream until it closes. Each message is
    /// dispatched on its own task so arrivals during an active pipeline
    /// run reach the in-flight guard immediately and get dropped there
    /// instead of queueing behind the run.
    pub async fn run(self: Arc<Self>) -> Result<(), WatcherError> {
        let mut inbound = self
            .transport
            .subscribe()
            .await
            .map_err(|e| WatcherError::SubscribeFailed(e.to_string()))?;

        tracing::info!("Watcher started, waiting for group messages");

        let mut tasks = JoinSet::new();
        loop {
            tokio::select! {
                maybe = inbound.recv() => match maybe {
                    Some(message) => {
                        let watcher = Arc::clone(&self);
                        tasks.spawn(async move { watcher.handle_message(message).await });
                    }
                    None => break,
                },
                Some(joined) = tasks.join_next() => {
                    if let Err(e) = joined {
                        tracing::error!("Message task failed: {}", e);
                    }
                }
            }
        }

        // Let an in-flight run finish before reporting the stop
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Message task failed: {}", e);
            }
        }

        tracing::info!("Chat transport closed, watcher stopping");
        Ok(())
    }

    /// Process one message, or drop it when the pipeline is busy
    pub async fn handle_message(&self, message: InboundMessage) {
        if Some(message.chat_id) == self.excluded_chat_id {
            tracing::debug!("Ignoring message from own notification chat {}", message.chat_id);
            return;
        }

        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("Pipeline busy, dropping message from {:?}", message.chat_title);
            return;
        };

        self.process(&message).await;
    }

    async fn process(&self, message: &InboundMessage) {
        let Some(candidate) = self.scanner.scan(&message.text) else {
            return;
        };

        let group_name = message.chat_title.as_str();
        tracing::info!(
            "Detected {} address {} in group {:?}",
            candidate.chain,
            candidate.address,
            group_name
        );

        let record = self
            .aggregator
            .aggregate(&candidate.address, candidate.chain)
            .await;

        // Every sighting lands in the roster, enriched or not
        if let Err(e) = self.roster.record_sighting(
            &candidate.address,
            candidate.chain,
            group_name,
            message.participants,
            record.as_ref(),
        ) {
            tracing::warn!("Roster update failed for {}: {}", candidate.address, e);
        }

        let Some(record) = record else {
            // Not a known token: no notification decision is made at all
            return;
        };

        let now = Utc::now();
        if !self.gate.should_notify(&record.address, now) {
            return;
        }

        // Record before delivery; a failed send does not roll this back
        if let Err(e) = self.gate.record_posting(&record.address, now) {
            tracing::warn!("Failed to record posting for {}: {}", record.address, e);
        }

        let payload = format_record(&record);
        match self.notifier.send(&payload).await {
            Ok(()) => tracing::info!("Notified for {}", record.address),
            Err(e) => tracing::warn!("Notification delivery failed for {}: {}", record.address, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::postings::PostingLog;
    use crate::domain::record::ChainKind;
    use crate::ports::mocks::{
        MockChatTransport, MockContentFetcher, MockNotifier, MockPools, MockRegistry, MockScraper,
    };
    use crate::ports::sources::{AssetInfo, ScrapeOutcome};
    use chrono::Duration;
    use tempfile::TempDir;

    const MINT: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    fn message(chat_id: i64, text: &str) -> InboundMessage {
        InboundMessage {
            chat_id,
            chat_title: "alpha calls".to_string(),
            participants: ParticipantCount::Known(250),
            text: text.to_string(),
        }
    }

    fn abc_registry() -> MockRegistry {
        MockRegistry::new().with_asset(AssetInfo {
            name: Some("ABC Token".to_string()),
            symbol: Some("ABC".to_string()),
            owner: Some("Own1".to_string()),
            raw_supply: Some(1_000_000_000),
            decimals: Some(9),
            json_uri: None,
        })
    }

    struct Fixture {
        watcher: Watcher,
        notifier: Arc<MockNotifier>,
        roster: Roster,
        _dir: TempDir,
    }

    fn fixture(registry: MockRegistry, transport: MockChatTransport) -> Fixture {
        let dir = TempDir::new().unwrap();
        let roster = Roster::new(dir.path().join("addresses.json"));
        let log = PostingLog::new(dir.path().join("messages.json"), Duration::seconds(180));
        let notifier = Arc::new(MockNotifier::new());

        let aggregator = MetadataAggregator::new(
            Arc::new(registry),
            Arc::new(MockContentFetcher::new()),
            Arc::new(
                MockScraper::new().with_outcome(ScrapeOutcome::Figures {
                    bonding_curve_progress: "42%".to_string(),
                    market_cap: 12345.0,
                }),
            ),
            Arc::new(MockPools::new()),
        );

        let watcher = Watcher::new(
            AddressScanner::new(),
            aggregator,
            NotificationGate::new(log),
            roster.clone(),
            Arc::new(transport),
            notifier.clone(),
        );

        Fixture {
            watcher,
            notifier,
            roster,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn test_detected_token_is_notified_and_rostered() {
        let text = format!("buy $ABC {} now", MINT);
        let fx = fixture(abc_registry(), MockChatTransport::new().with_message(message(1, &text)));

        Arc::new(fx.watcher).run().await.unwrap();

        let sent = fx.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("*Name:* ABC Token"));
        assert!(sent[0].text.contains("*Bonding Curve:* 42%"));

        let entries = fx.roster.load();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].address, MINT);
        assert_eq!(entries[0].groups[0].group_name, "alpha calls");
        assert_eq!(
            entries[0].metadata.as_ref().unwrap().name.as_deref(),
            Some("ABC Token")
        );
    }

    #[tokio::test]
    async fn test_unknown_asset_sighted_but_never_notified() {
        let text = format!("what is {}", MINT);
        let fx = fixture(
            MockRegistry::new(),
            MockChatTransport::new().with_message(message(1, &text)),
        );

        Arc::new(fx.watcher).run().await.unwrap();

        assert!(fx.notifier.sent().is_empty());
        let entries = fx.roster.load();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].metadata.is_none());
    }

    #[tokio::test]
    async fn test_message_without_address_is_ignored() {
        let fx = fixture(
            abc_registry(),
            MockChatTransport::new().with_message(message(1, "gm everyone")),
        );

        Arc::new(fx.watcher).run().await.unwrap();

        assert!(fx.notifier.sent().is_empty());
        assert!(fx.roster.load().is_empty());
    }

    #[tokio::test]
    async fn test_own_chat_is_excluded() {
        let text = format!("echo {}", MINT);
        let Fixture {
            watcher,
            notifier,
            roster,
            _dir,
        } = fixture(
            abc_registry(),
            MockChatTransport::new().with_message(message(99, &text)),
        );
        let watcher = watcher.with_excluded_chat(99);

        Arc::new(watcher).run().await.unwrap();

        assert!(notifier.sent().is_empty());
        assert!(roster.load().is_empty());
    }

    #[tokio::test]
    async fn test_message_arriving_mid_run_is_dropped() {
        let other_mint = "So11111111111111111111111111111111111111112";
        let transport = MockChatTransport::new()
            .with_message(message(1, &format!("first {}", MINT)))
            .with_message(message(2, &format!("second {}", other_mint)));
        // Hold the first run open so the second message meets a busy guard
        let registry = abc_registry().with_delay(std::time::Duration::from_millis(50));
        let fx = fixture(registry, transport);

        Arc::new(fx.watcher).run().await.unwrap();

        // The second message was discarded outright: no sighting, no gate
        let entries = fx.roster.load();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].address, MINT);
        assert_eq!(fx.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_repeat_inside_cooldown_notifies_once() {
        let text = format!("ape {}", MINT);
        let transport = MockChatTransport::new()
            .with_message(message(1, &text))
            .with_message(message(2, &text));
        let fx = fixture(abc_registry(), transport);

        Arc::new(fx.watcher).run().await.unwrap();

        assert_eq!(fx.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_delivery_failure_still_records_posting() {
        let dir = TempDir::new().unwrap();
        let roster = Roster::new(dir.path().join("addresses.json"));
        let log = PostingLog::new(dir.path().join("messages.json"), Duration::seconds(180));
        let gate = NotificationGate::new(log);
        let notifier = Arc::new(MockNotifier::new().failing());

        let aggregator = MetadataAggregator::new(
            Arc::new(abc_registry()),
            Arc::new(MockContentFetcher::new()),
            Arc::new(MockScraper::new()),
            Arc::new(MockPools::new()),
        );

        let text = format!("ape {}", MINT);
        let watcher = Watcher::new(
            AddressScanner::new(),
            aggregator,
            gate.clone(),
            roster,
            Arc::new(MockChatTransport::new().with_message(message(1, &text))),
            notifier.clone(),
        );

        Arc::new(watcher).run().await.unwrap();

        // Delivery failed, yet the cooldown is armed
        assert_eq!(notifier.sent().len(), 1);
        assert!(!gate.should_notify(MINT, Utc::now()));
    }
}

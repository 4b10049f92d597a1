//! Telegram Updates Source
//!
//! Long-polls the Bot API `getUpdates` endpoint and feeds group messages
//! into the watcher as InboundMessage events. Member counts come from
//! `getChatMemberCount` per chat; when the bot lacks the privilege to see
//! them the count degrades to the "unknown" sentinel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tokio::sync::mpsc;

use super::types::{ApiResponse, Update};
use crate::domain::roster::ParticipantCount;
use crate::ports::chat::{ChatError, ChatTransport, InboundMessage};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
/// Long-poll hold time requested from the API
const POLL_TIMEOUT_SECS: u64 = 30;
/// Pause before retrying after a transport error
const RETRY_DELAY_SECS: u64 = 5;
const CHANNEL_CAPACITY: usize = 64;

/// Long-polling chat source
#[derive(Debug, Clone)]
pub struct TelegramUpdatesSource {
    http: Client,
    api_base: String,
    token: String,
}

impl TelegramUpdatesSource {
    pub fn new(token: impl Into<String>) -> Result<Self, ChatError> {
        // Client timeout must exceed the long-poll hold time
        let http = Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 15))
            .build()
            .map_err(|e| ChatError::ConnectionFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, ChatError> {
        let response = self
            .http
            .post(self.method_url("getUpdates"))
            .json(&json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message", "channel_post"],
            }))
            .send()
            .await
            .map_err(|e| ChatError::ConnectionFailed(e.to_string()))?;

        let body: ApiResponse<Vec<Update>> = response
            .json()
            .await
            .map_err(|e| ChatError::ApiError(e.to_string()))?;

        if !body.ok {
            return Err(ChatError::ApiError(
                body.description.unwrap_or_else(|| "getUpdates failed".into()),
            ));
        }

        Ok(body.result.unwrap_or_default())
    }

    /// Best-effort member count; any failure becomes the unknown sentinel
    async fn member_count(&self, chat_id: i64) -> ParticipantCount {
        let result = self
            .http
            .post(self.method_url("getChatMemberCount"))
            .json(&json!({ "chat_id": chat_id }))
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("getChatMemberCount for {} failed: {}", chat_id, e);
                return ParticipantCount::unknown();
            }
        };

        match response.json::<ApiResponse<u64>>().await {
            Ok(body) if body.ok => body
                .result
                .map(ParticipantCount::Known)
                .unwrap_or_else(ParticipantCount::unknown),
            Ok(body) => {
                tracing::debug!(
                    "getChatMemberCount for {} refused: {:?}",
                    chat_id,
                    body.description
                );
                ParticipantCount::unknown()
            }
            Err(e) => {
                tracing::debug!("getChatMemberCount parse error for {}: {}", chat_id, e);
                ParticipantCount::unknown()
            }
        }
    }

    async fn poll_loop(self, tx: mpsc::Sender<InboundMessage>) {
        let mut offset = 0i64;

        loop {
            let updates = match self.get_updates(offset).await {
                Ok(u) => u,
                Err(e) => {
                    tracing::warn!("getUpdates error: {}, retrying", e);
                    tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECS)).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                let Some(message) = update.into_message() else {
                    continue;
                };
                if !message.chat.is_group_like() {
                    continue;
                }
                let Some(text) = message.text else {
                    continue;
                };

                let inbound = InboundMessage {
                    chat_id: message.chat.id,
                    chat_title: message.chat.title.unwrap_or_else(|| "Unknown".to_string()),
                    participants: self.member_count(message.chat.id).await,
                    text,
                };

                if tx.send(inbound).await.is_err() {
                    tracing::info!("Update receiver dropped, stopping poll loop");
                    return;
                }
            }
        }
    }
}

#[async_trait]
impl ChatTransport for TelegramUpdatesSource {
    async fn subscribe(&self) -> Result<mpsc::Receiver<InboundMessage>, ChatError> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let source = self.clone();
        tokio::spawn(source.poll_loop(tx));
        Ok(rx)
    }
}

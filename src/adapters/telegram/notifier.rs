//! Telegram Notifier
//!
//! Delivers a formatted payload to the configured destination chats via
//! the Bot API. Payloads with an image go out as `sendPhoto` with the
//! text as caption; the rest as `sendMessage` with link previews off.
//! One failing destination does not stop delivery to the others.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::types::ApiResponse;
use crate::domain::record::NotificationPayload;
use crate::ports::notify::{Notifier, NotifyError};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const SEND_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http: Client,
    api_base: String,
    token: String,
    chat_ids: Vec<i64>,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_ids: Vec<i64>) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .map_err(|e| NotifyError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
            chat_ids,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn send_to(&self, chat_id: i64, payload: &NotificationPayload) -> Result<(), NotifyError> {
        let (method, body) = match &payload.image {
            Some(image) => (
                "sendPhoto",
                json!({
                    "chat_id": chat_id,
                    "photo": image,
                    "caption": payload.text,
                    "parse_mode": "Markdown",
                }),
            ),
            None => (
                "sendMessage",
                json!({
                    "chat_id": chat_id,
                    "text": payload.text,
                    "parse_mode": "Markdown",
                    "disable_web_page_preview": true,
                }),
            ),
        };

        let response = self
            .http
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::DeliveryFailed(e.to_string()))?;

        let parsed: ApiResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| NotifyError::ApiError(e.to_string()))?;

        if !parsed.ok {
            return Err(NotifyError::ApiError(
                parsed.description.unwrap_or_else(|| method.to_string()),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        let mut delivered = 0usize;

        for &chat_id in &self.chat_ids {
            match self.send_to(chat_id, payload).await {
                Ok(()) => {
                    delivered += 1;
                    tracing::info!("Notification delivered to chat {}", chat_id);
                }
                Err(e) => {
                    tracing::warn!("Delivery to chat {} failed: {}", chat_id, e);
                }
            }
        }

        if delivered == 0 && !self.chat_ids.is_empty() {
            return Err(NotifyError::DeliveryFailed(
                "no destination accepted the notification".into(),
            ));
        }

        Ok(())
    }
}

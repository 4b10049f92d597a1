//! Chat Transport Port
//!
//! Inbound side of the system: a stream of chat messages from whatever
//! platform client is plugged in. The core needs only the message text,
//! a display name for the group, and a best-effort member count.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::roster::ParticipantCount;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Chat connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Chat API error: {0}")]
    ApiError(String),
}

/// One inbound chat message
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub chat_title: String,
    pub participants: ParticipantCount,
    pub text: String,
}

/// Source of inbound chat messages
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Start receiving; the returned channel closes when the transport
    /// shuts down
    async fn subscribe(&self) -> Result<mpsc::Receiver<InboundMessage>, ChatError>;
}

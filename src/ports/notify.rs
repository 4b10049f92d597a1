//! Notifier Port
//!
//! Outbound delivery of a formatted payload to the destination channels.
//! Delivery is at-most-once: a failure is logged by the caller and never
//! rolls back the gate's recorded posting.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::record::NotificationPayload;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Notifier API error: {0}")]
    ApiError(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the payload to all configured destinations
    async fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError>;
}

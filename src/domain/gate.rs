//! Notification Gate
//!
//! Decides whether a detected token may notify right now. Two throttles
//! stack: a per-address cooldown, and a blunt global cooldown against the
//! most recent posting of any address so unrelated tokens cannot both fire
//! inside the same short window. The caller serializes check-then-record
//! runs, so the append stays atomic with respect to the check.

use chrono::{DateTime, Duration, Utc};

use super::postings::{PostingEntry, PostingLog, PostingLogError};

/// Minimum interval between two notifications for the same address
pub const PER_ADDRESS_COOLDOWN_SECS: i64 = 180;
/// Minimum interval between any two notifications
pub const GLOBAL_COOLDOWN_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct NotificationGate {
    log: PostingLog,
    per_address: Duration,
    global: Duration,
}

impl NotificationGate {
    pub fn new(log: PostingLog) -> Self {
        Self {
            log,
            per_address: Duration::seconds(PER_ADDRESS_COOLDOWN_SECS),
            global: Duration::seconds(GLOBAL_COOLDOWN_SECS),
        }
    }

    pub fn with_cooldowns(mut self, per_address: Duration, global: Duration) -> Self {
        self.per_address = per_address;
        self.global = global;
        self
    }

    /// Check both cooldowns against the persisted log
    pub fn should_notify(&self, address: &str, now: DateTime<Utc>) -> bool {
        let entries = self.log.load();
        self.evaluate(&entries, address, now)
    }

    /// Pure cooldown check over an already-loaded log
    pub fn evaluate(&self, entries: &[PostingEntry], address: &str, now: DateTime<Utc>) -> bool {
        for entry in entries {
            if entry.address == address && now - entry.posted_at < self.per_address {
                tracing::info!(
                    "Suppressing {}: posted {}s ago (per-address cooldown)",
                    address,
                    (now - entry.posted_at).num_seconds()
                );
                return false;
            }
        }

        // The log is time-ordered; the last entry is the most recent
        // posting across all addresses.
        if let Some(last) = entries.last() {
            if now - last.posted_at < self.global {
                tracing::info!(
                    "Suppressing {}: last notification {}s ago (global cooldown)",
                    address,
                    (now - last.posted_at).num_seconds()
                );
                return false;
            }
        }

        true
    }

    /// Record a permitted notification. Must be called before the next
    /// check can run.
    pub fn record_posting(&self, address: &str, now: DateTime<Utc>) -> Result<(), PostingLogError> {
        self.log.append(address, now)
    }
}

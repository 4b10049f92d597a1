//! Domain Layer - Core logic of the watcher
//!
//! Pure detection, gating, and formatting logic plus the two persisted
//! stores. External systems are reached only through the ports layer.

pub mod address;
pub mod formatter;
pub mod gate;
pub mod postings;
pub mod record;
pub mod roster;

pub use address::AddressScanner;
pub use formatter::format_record;
pub use gate::{NotificationGate, GLOBAL_COOLDOWN_SECS, PER_ADDRESS_COOLDOWN_SECS};
pub use postings::{PostingEntry, PostingLog, PostingLogError, DEFAULT_POSTING_LOG_FILE};
pub use record::{
    AddressCandidate, ChainKind, MarketSnapshot, NotificationPayload, SocialLinks, TokenRecord,
    TopHolder,
};
pub use roster::{
    GroupSighting, ParticipantCount, Roster, RosterEntry, RosterError, DEFAULT_ROSTER_FILE,
};

//! Token Record Types
//!
//! The aggregated metadata for one detected token address. A record is
//! assembled once by the aggregator and read-only afterwards; the gate and
//! the formatter never mutate it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which chain an address shape belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainKind {
    Solana,
    Evm,
    Unknown,
}

impl std::fmt::Display for ChainKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainKind::Solana => write!(f, "Solana"),
            ChainKind::Evm => write!(f, "EVM"),
            ChainKind::Unknown => write!(f, "Unknown"),
        }
    }
}

/// An address substring recognized in a chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCandidate {
    pub address: String,
    pub chain: ChainKind,
}

/// Social links pulled from the off-chain JSON metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
}

impl SocialLinks {
    pub fn is_empty(&self) -> bool {
        self.website.is_none() && self.twitter.is_none() && self.telegram.is_none()
    }
}

/// One ranked holder account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopHolder {
    pub address: String,
    /// UI-scaled balance
    pub balance: f64,
}

/// Market figures, populated from the venue scrape or the pools REST
/// fallback, never both
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Percentage string as shown by the venue, e.g. "42%"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonding_curve_progress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_hour_volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<f64>,
}

impl MarketSnapshot {
    pub fn is_empty(&self) -> bool {
        self.bonding_curve_progress.is_none()
            && self.market_cap.is_none()
            && self.one_hour_volume.is_none()
            && self.liquidity.is_none()
    }
}

/// Aggregated metadata for one address; `address` is the natural key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub address: String,
    pub chain: ChainKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Supply already divided by 10^decimals when decimals are known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "SocialLinks::is_empty")]
    pub links: SocialLinks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_holders: Vec<TopHolder>,
    #[serde(default, skip_serializing_if = "MarketSnapshot::is_empty")]
    pub market: MarketSnapshot,
}

impl TokenRecord {
    /// A record carrying only the address and its chain kind
    pub fn bare(address: impl Into<String>, chain: ChainKind) -> Self {
        Self {
            address: address.into(),
            chain,
            name: None,
            symbol: None,
            supply: None,
            decimals: None,
            owner: None,
            image: None,
            links: SocialLinks::default(),
            listing_url: None,
            top_holders: Vec::new(),
            market: MarketSnapshot::default(),
        }
    }
}

/// A formatted notification ready for delivery
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPayload {
    pub text: String,
    pub image: Option<String>,
}

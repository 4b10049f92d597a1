//! Pools REST Fallback
//!
//! GeckoTerminal public pools endpoint for the chain. Used when the venue
//! scrape defers (completed bonding curve) or fails outright; the first
//! listed pool supplies one-hour volume, fully-diluted market cap, and
//! reserve liquidity.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::ports::sources::{MarketPools, PoolsError, PoolStats};

const DEFAULT_API_BASE: &str = "https://api.geckoterminal.com/api/v2";
const NETWORK: &str = "solana";

#[derive(Debug, Clone, Deserialize)]
struct PoolsResponse {
    #[serde(default)]
    data: Vec<Pool>,
}

#[derive(Debug, Clone, Deserialize)]
struct Pool {
    attributes: PoolAttributes,
}

#[derive(Debug, Clone, Deserialize)]
struct PoolAttributes {
    volume_usd: VolumeUsd,
    /// Fully-diluted valuation, serialized as a decimal string
    fdv_usd: Option<String>,
    reserve_in_usd: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct VolumeUsd {
    h1: Option<String>,
}

/// GeckoTerminal pools client
#[derive(Debug, Clone)]
pub struct PoolsClient {
    http: Client,
    api_base: String,
}

impl PoolsClient {
    pub fn new(timeout: Duration) -> Result<Self, PoolsError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PoolsError::RequestError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

fn parse_field(value: Option<&String>, field: &str) -> Result<f64, PoolsError> {
    value
        .ok_or_else(|| PoolsError::ParseError(format!("{} missing", field)))?
        .parse()
        .map_err(|e| PoolsError::ParseError(format!("{}: {}", field, e)))
}

fn stats_from_response(address: &str, response: PoolsResponse) -> Result<PoolStats, PoolsError> {
    let pool = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| PoolsError::NoPools(address.to_string()))?;

    let attrs = pool.attributes;
    Ok(PoolStats {
        one_hour_volume: parse_field(attrs.volume_usd.h1.as_ref(), "volume_usd.h1")?,
        market_cap: parse_field(attrs.fdv_usd.as_ref(), "fdv_usd")?,
        liquidity: parse_field(attrs.reserve_in_usd.as_ref(), "reserve_in_usd")?,
    })
}

#[async_trait]
impl MarketPools for PoolsClient {
    async fn fetch_pool_stats(&self, address: &str) -> Result<PoolStats, PoolsError> {
        let url = format!(
            "{}/networks/{}/tokens/{}/pools?page=1",
            self.api_base, NETWORK, address
        );

        let response = self
            .http
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| PoolsError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PoolsError::RequestError(format!(
                "Unexpected status: {}",
                response.status()
            )));
        }

        let body: PoolsResponse = response
            .json()
            .await
            .map_err(|e| PoolsError::ParseError(e.to_string()))?;

        stats_from_response(address, body)
    }
}

//! Registry Client
//!
//! JSON-RPC client for the on-chain asset registry: DAS `getAsset` for
//! name/symbol/supply/owner and the metadata pointer URI, plus
//! `getTokenLargestAccounts` for the holder ranking. Retries with backoff
//! on rate limits and server errors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::types::{AssetResult, LargestAccountsResult, RpcResponse};
use crate::domain::record::TopHolder;
use crate::ports::sources::{AssetInfo, AssetRegistry, RegistryError};

/// Configuration for the RegistryClient
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Chain RPC endpoint URL
    pub rpc_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Number of retry attempts
    pub max_retries: u32,
    /// Base delay for exponential backoff (milliseconds)
    pub retry_base_delay_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            timeout: Duration::from_secs(20),
            max_retries: 3,
            retry_base_delay_ms: 500,
        }
    }
}

impl RegistryConfig {
    pub fn with_rpc_url(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }
}

/// On-chain registry lookup client
#[derive(Debug, Clone)]
pub struct RegistryClient {
    config: RegistryConfig,
    http: Client,
}

impl RegistryClient {
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, RegistryError> {
        Self::with_config(RegistryConfig::with_rpc_url(rpc_url))
    }

    pub fn with_config(config: RegistryConfig) -> Result<Self, RegistryError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RegistryError::RpcError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn rpc_url(&self) -> &str {
        &self.config.rpc_url
    }

    /// POST one JSON-RPC call with retry on 429/5xx
    async fn rpc_call<T: DeserializeOwned>(
        &self,
        body: serde_json::Value,
    ) -> Result<RpcResponse<T>, RegistryError> {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            let response = match self.http.post(&self.config.rpc_url).json(&body).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(RegistryError::RpcError(e.to_string()));
                    let backoff =
                        Duration::from_millis(self.config.retry_base_delay_ms * (attempt as u64 + 1));
                    tokio::time::sleep(backoff).await;
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let backoff = Duration::from_millis(
                    self.config.retry_base_delay_ms * 2u64.pow(attempt + 1),
                );
                tracing::warn!(
                    "Registry rate limited (429), backing off for {:?} (attempt {}/{})",
                    backoff,
                    attempt + 1,
                    self.config.max_retries
                );
                last_error = Some(RegistryError::RpcError("rate limited".into()));
                tokio::time::sleep(backoff).await;
                continue;
            }

            if status.is_server_error() {
                last_error = Some(RegistryError::RpcError(format!("Server error: {}", status)));
                let backoff =
                    Duration::from_millis(self.config.retry_base_delay_ms * (attempt as u64 + 1));
                tokio::time::sleep(backoff).await;
                continue;
            }

            if !status.is_success() {
                return Err(RegistryError::RpcError(format!(
                    "Unexpected status: {}",
                    status
                )));
            }

            return response
                .json::<RpcResponse<T>>()
                .await
                .map_err(|e| RegistryError::ParseError(e.to_string()));
        }

        Err(last_error.unwrap_or_else(|| RegistryError::RpcError("Max retries exceeded".into())))
    }
}

/// Map the raw `getAsset` result into the port's AssetInfo
fn asset_info_from_result(result: AssetResult) -> AssetInfo {
    let (name, symbol, json_uri) = match result.content {
        Some(content) => {
            let (name, symbol) = match content.metadata {
                Some(metadata) => (metadata.name, metadata.symbol),
                None => (None, None),
            };
            (name, symbol, content.json_uri)
        }
        None => (None, None, None),
    };

    let (raw_supply, decimals) = match result.token_info {
        Some(info) => (info.supply, info.decimals),
        None => (None, None),
    };

    AssetInfo {
        name,
        symbol,
        owner: result.ownership.and_then(|o| o.owner),
        raw_supply,
        decimals,
        json_uri,
    }
}

#[async_trait]
impl AssetRegistry for RegistryClient {
    async fn get_asset(&self, address: &str) -> Result<Option<AssetInfo>, RegistryError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": "mintwatch",
            "method": "getAsset",
            "params": {
                "id": address,
                "displayOptions": { "showFungible": true }
            }
        });

        let response: RpcResponse<AssetResult> = self.rpc_call(body).await?;

        if let Some(error) = response.error {
            // DAS reports an unknown asset as an RPC error, not an empty
            // result; either way it is a definitive negative.
            tracing::debug!("getAsset for {}: {} ({})", address, error.message, error.code);
            return Ok(None);
        }

        Ok(response.result.map(asset_info_from_result))
    }

    async fn get_largest_holders(&self, address: &str) -> Result<Vec<TopHolder>, RegistryError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": "mintwatch",
            "method": "getTokenLargestAccounts",
            "params": [address]
        });

        let response: RpcResponse<LargestAccountsResult> = self.rpc_call(body).await?;

        if let Some(error) = response.error {
            return Err(RegistryError::RpcError(format!(
                "getTokenLargestAccounts: {} ({})",
                error.message, error.code
            )));
        }

        let holders = response
            .result
            .map(|r| r.value)
            .unwrap_or_default()
            .into_iter()
            .map(|account| TopHolder {
                address: account.address,
                balance: account.ui_amount.unwrap_or(0.0),
            })
            .collect();

        Ok(holders)
    }
}

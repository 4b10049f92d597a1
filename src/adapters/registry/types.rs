//! Registry RPC Types
//!
//! Response shapes for the DAS `getAsset` call and the
//! `getTokenLargestAccounts` holder ranking.

use serde::Deserialize;

/// Generic JSON-RPC envelope
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
}

/// `getAsset` result
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetResult {
    #[serde(default)]
    pub content: Option<AssetContent>,
    #[serde(default)]
    pub token_info: Option<AssetTokenInfo>,
    #[serde(default)]
    pub ownership: Option<AssetOwnership>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetContent {
    #[serde(default)]
    pub metadata: Option<AssetMetadata>,
    #[serde(default)]
    pub json_uri: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetTokenInfo {
    /// Raw integer supply in base units
    #[serde(default)]
    pub supply: Option<u128>,
    #[serde(default)]
    pub decimals: Option<u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetOwnership {
    #[serde(default)]
    pub owner: Option<String>,
}

/// `getTokenLargestAccounts` result
#[derive(Debug, Clone, Deserialize)]
pub struct LargestAccountsResult {
    pub value: Vec<LargestAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LargestAccount {
    pub address: String,
    /// UI-scaled balance; null for zeroed accounts
    #[serde(rename = "uiAmount")]
    pub ui_amount: Option<f64>,
}

//! Content Metadata Adapter
//!
//! Fetches the off-chain JSON the registry's pointer URI refers to (token
//! image and social links). The two gateway hostnames below mirror the
//! same content-addressed storage; the primary one is rewritten to the
//! alternate before fetching because it is frequently unreachable.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::ports::sources::{ContentError, ContentFields, ContentMetadataFetcher};

const PRIMARY_GATEWAY: &str = "https://cf-ipfs.com/ipfs/";
const ALTERNATE_GATEWAY: &str = "https://ipfs.io/ipfs/";

/// Rewrite the primary gateway hostname to the alternate mirror
pub fn rewrite_gateway(uri: &str) -> String {
    uri.replace(PRIMARY_GATEWAY, ALTERNATE_GATEWAY)
}

/// Off-chain JSON metadata shape; unknown fields are ignored
#[derive(Debug, Clone, Default, Deserialize)]
struct ContentDocument {
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    twitter: Option<String>,
    #[serde(default)]
    telegram: Option<String>,
}

/// HTTP fetcher for content-addressed token metadata
#[derive(Debug, Clone)]
pub struct ContentClient {
    http: Client,
}

impl ContentClient {
    pub fn new(timeout: Duration) -> Result<Self, ContentError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ContentError::FetchError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ContentMetadataFetcher for ContentClient {
    async fn fetch(&self, uri: &str) -> Result<ContentFields, ContentError> {
        let uri = rewrite_gateway(uri);

        let response = self
            .http
            .get(&uri)
            .send()
            .await
            .map_err(|e| ContentError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ContentError::FetchError(format!(
                "Unexpected status {} from {}",
                response.status(),
                uri
            )));
        }

        let document: ContentDocument = response
            .json()
            .await
            .map_err(|e| ContentError::ParseError(e.to_string()))?;

        let mut fields = ContentFields::default();
        fields.image = document.image.map(|i| rewrite_gateway(&i));
        fields.links.website = document.website;
        fields.links.twitter = document.twitter;
        fields.links.telegram = document.telegram;
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_primary_gateway() {
        assert_eq!(
            rewrite_gateway("https://cf-ipfs.com/ipfs/Qm123"),
            "https://ipfs.io/ipfs/Qm123"
        );
    }

    #[test]
    fn test_rewrite_leaves_other_hosts_alone() {
        assert_eq!(
            rewrite_gateway("https://ipfs.io/ipfs/Qm123"),
            "https://ipfs.io/ipfs/Qm123"
        );
        assert_eq!(
            rewrite_gateway("https://arweave.net/abc"),
            "https://arweave.net/abc"
        );
    }

    #[test]
    fn test_document_parse_partial_fields() {
        let json = r#"{"image": "https://cf-ipfs.com/ipfs/QmImg", "twitter": "https://x.com/abc", "extra": 1}"#;
        let document: ContentDocument = serde_json::from_str(json).unwrap();
        assert_eq!(document.image.as_deref(), Some("https://cf-ipfs.com/ipfs/QmImg"));
        assert_eq!(document.twitter.as_deref(), Some("https://x.com/abc"));
        assert!(document.website.is_none());
    }
}

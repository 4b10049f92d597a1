//! Plain-HTTP Page Renderer
//!
//! Fetches the raw document over HTTP. Sufficient for server-rendered
//! listing pages; venues that paint their figures client-side need a
//! PageRenderer backed by a real browser plugged in at the same port.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::ports::renderer::{PageRenderer, RenderError};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0";

#[derive(Debug, Clone)]
pub struct HttpRenderer {
    http: Client,
}

impl HttpRenderer {
    pub fn new(timeout: Duration) -> Result<Self, RenderError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RenderError::NavigationFailed(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RenderError::Timeout(e.to_string())
                } else {
                    RenderError::NavigationFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(RenderError::NavigationFailed(format!(
                "Unexpected status {} from {}",
                response.status(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| RenderError::NavigationFailed(e.to_string()))
    }
}

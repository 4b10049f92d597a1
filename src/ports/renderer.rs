//! Page Renderer Port
//!
//! Boundary around the browser-rendering machinery the market scraper
//! needs. The scraper only consumes the rendered document text; how the
//! page gets rendered (headless browser, remote service, plain HTTP for
//! server-rendered pages) is the adapter's business.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Render timed out: {0}")]
    Timeout(String),
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Load the page and return its rendered document text
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

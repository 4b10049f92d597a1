//! Market Venue Scraper
//!
//! Reads the two labeled figures off a rendered listing page: "bonding
//! curve progress" and "Market cap". Rendering goes through the
//! PageRenderer port; this module only does label extraction. A progress
//! of 100% means the token has migrated off the bonding curve and the
//! page figures are stale, so the scrape defers to the pools fallback.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ports::renderer::PageRenderer;
use crate::ports::sources::{MarketScraper, ScrapeError, ScrapeOutcome};

const PROGRESS_LABEL: &str = "bonding curve progress";
const MARKET_CAP_LABEL: &str = "Market cap";
/// Progress value that marks a completed curve
const COMPLETE_PROGRESS: &str = "100%";

/// Scraper over any PageRenderer implementation
pub struct ScraperClient {
    renderer: Arc<dyn PageRenderer>,
}

impl ScraperClient {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self { renderer }
    }
}

/// Extract the value following `label: ` in rendered document text, up to
/// the next tag boundary or line break
fn extract_labeled(text: &str, label: &str) -> Option<String> {
    let start = text.find(label)? + label.len();
    let rest = text.get(start..)?;
    let rest = rest.strip_prefix(':')?.trim_start();

    let end = rest
        .find(|c: char| c == '<' || c == '\n' || c == '\r')
        .unwrap_or(rest.len());
    let value = rest[..end].trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a currency display string like "$12,345.6" into a number
fn parse_currency(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().ok()
}

#[async_trait]
impl MarketScraper for ScraperClient {
    async fn scrape(&self, listing_url: &str, address: &str) -> Result<ScrapeOutcome, ScrapeError> {
        let page = self
            .renderer
            .render(listing_url)
            .await
            .map_err(|e| ScrapeError::RenderFailed(e.to_string()))?;

        let progress = extract_labeled(&page, PROGRESS_LABEL)
            .ok_or_else(|| ScrapeError::MissingField(PROGRESS_LABEL.to_string()))?;

        if progress == COMPLETE_PROGRESS {
            tracing::info!(
                "Bonding curve complete for {}, deferring to pools data",
                address
            );
            return Ok(ScrapeOutcome::Deferred);
        }

        let market_cap_text = extract_labeled(&page, MARKET_CAP_LABEL)
            .ok_or_else(|| ScrapeError::MissingField(MARKET_CAP_LABEL.to_string()))?;
        let market_cap = parse_currency(&market_cap_text)
            .ok_or_else(|| ScrapeError::MissingField(MARKET_CAP_LABEL.to_string()))?;

        tracing::debug!(
            "Scraped {}: progress {}, market cap {}",
            address,
            progress,
            market_cap
        );

        Ok(ScrapeOutcome::Figures {
            bonding_curve_progress: progress,
            market_cap,
        })
    }
}

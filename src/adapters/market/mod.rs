//! Market data adapters: venue page scraper and pools REST fallback

pub mod rest;
pub mod scraper;

pub use rest::PoolsClient;
pub use scraper::ScraperClient;

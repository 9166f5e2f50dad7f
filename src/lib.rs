//! Catalog-Harvest: a concurrent crawler for hierarchical product catalogs
//!
//! This crate walks a catalog that is only available as rendered HTML
//! (brand → collection → product), extracts a record from every page and
//! assembles one nested document per brand.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod model;
pub mod output;

use thiserror::Error;

/// Main error type for Catalog-Harvest operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Giving up on {url} after {attempts} attempts: {last}")]
    FetchExhausted {
        url: String,
        attempts: u32,
        #[source]
        last: FetchError,
    },

    #[error("Extraction failed for {url}: {source}")]
    Extraction {
        url: String,
        #[source]
        source: extract::ExtractError,
    },

    #[error("Persistence error: {0}")]
    Persistence(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("All {failed} root URLs failed")]
    AllRootsFailed { failed: usize },
}

/// A single failed attempt at fetching a page
///
/// These are retried by the fetcher and never escape it on their own; once
/// the retry budget is spent the last one is wrapped in
/// [`CrawlError::FetchExhausted`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("failed to read body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("admission gate closed")]
    GateClosed,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Catalog-Harvest operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl_roots, run_crawl, Coordinator, Fetcher, RunReport};
pub use model::{Brand, ChildRef, Collection, Product};

//! Sumi-Seek: a bounded-concurrency text finder for the web
//!
//! This crate crawls outward from a seed page with a fixed pool of workers,
//! searching every fetched page for a piece of text. The crawl stops by itself
//! once the frontier runs dry or the page budget is spent.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Seek operations
#[derive(Debug, Error)]
pub enum SeekError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PageState,
        to: state::PageState,
    },

    #[error("Crawl is already running (state: {0})")]
    AlreadyRunning(state::CrawlState),

    #[error("Coordinator has been disposed")]
    Disposed,
}

/// Configuration-specific errors
///
/// These are also the argument errors returned by `Coordinator::start`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Search text cannot be empty")]
    EmptySearchText,

    #[error("max_workers ({workers}) must not exceed max_pages ({pages})")]
    WorkersExceedPages { workers: usize, pages: usize },

    #[error("{0} must be greater than zero")]
    NonPositive(&'static str),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sumi-Seek operations
pub type Result<T> = std::result::Result<T, SeekError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlEvent, PageSnapshot};
pub use state::{CrawlState, PageState};
pub use crate::url::{page_key, resolve_href};

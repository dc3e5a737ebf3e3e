//! State module for tracking crawl progress
//!
//! This module provides the state enums shared by the crawl engine.
//!
//! # Components
//!
//! - `PageState`: Tracks the state of an individual page (waiting, downloading, found, etc.)
//! - `CrawlState`: Tracks the lifecycle of a whole crawl session

mod crawl_state;
mod page_state;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_state::PageState;

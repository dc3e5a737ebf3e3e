//! Crawl engine
//!
//! This module contains the concurrent text-finding crawl, including:
//! - The page unit and its forward-only state machine
//! - The bounded, deduplicating frontier shared by the workers
//! - The worker loop that fetches, searches and follows links
//! - The coordinator that owns the session lifecycle
//! - The transport and link parser collaborators

mod coordinator;
mod events;
mod fetcher;
mod frontier;
mod page;
mod parser;
mod worker;

#[cfg(test)]
mod testing;

pub use coordinator::Coordinator;
pub use events::{progress_percent, CrawlEvent};
pub use fetcher::{build_http_client, FetchError, HttpTransport, Transport};
pub use frontier::Frontier;
pub use page::{Page, PageSnapshot};
pub use parser::{HtmlLinkParser, LinkParser};

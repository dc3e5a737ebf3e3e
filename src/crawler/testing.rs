//! In-memory collaborators for engine tests

use crate::crawler::fetcher::{FetchError, Transport};
use crate::crawler::parser::LinkParser;
use crate::url::page_key;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

pub(crate) fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

/// Serves fixed bodies keyed by page identity; unknown pages answer 404
#[derive(Default)]
pub(crate) struct MapTransport {
    pages: HashMap<String, String>,
    delay: Duration,
    fetches: AtomicUsize,
}

impl MapTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, uri: &str, body: &str) -> Self {
        self.pages.insert(page_key(&url(uri)), body.to_string());
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MapTransport {
    async fn fetch(&self, uri: &Url, cancel: &CancellationToken) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            _ = tokio::time::sleep(self.delay) => {}
        }
        self.pages
            .get(&page_key(uri))
            .cloned()
            .ok_or_else(|| FetchError::Status {
                code: 404,
                reason: "Not Found".to_string(),
            })
    }
}

/// Never answers; only cancellation ends a fetch
pub(crate) struct HangingTransport;

#[async_trait]
impl Transport for HangingTransport {
    async fn fetch(&self, _uri: &Url, cancel: &CancellationToken) -> Result<String, FetchError> {
        cancel.cancelled().await;
        Err(FetchError::Cancelled)
    }
}

/// Parser that rejects every document
pub(crate) struct FailingParser;

impl LinkParser for FailingParser {
    fn extract_hrefs(&self, _markup: &str) -> Result<Vec<String>, String> {
        Err("parser exploded".to_string())
    }
}

/// Builds markup with one anchor per href
pub(crate) fn links_page(body: &str, hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!("<html><body><p>{}</p>{}</body></html>", body, anchors)
}

/// Polls `condition` until it holds, panicking after five seconds
pub(crate) async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {}",
            what
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

//! Page unit: one URI and its crawl state
//!
//! A page is created in `Wait` by whoever discovered its URI, handed to the
//! frontier, and later claimed by exactly one worker which fetches, searches
//! and mines it for links. Failures are recorded on the page as `Error` state
//! plus a message; nothing here returns an error to the worker.

use crate::crawler::fetcher::Transport;
use crate::crawler::parser::LinkParser;
use crate::state::PageState;
use crate::url::{page_key, resolve_href};
use crate::SeekError;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Read-only copy of a page for observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSnapshot {
    pub uri: String,
    pub state: PageState,
    pub error: Option<String>,
}

#[derive(Debug)]
struct PageData {
    state: PageState,
    content: Option<Arc<str>>,
    error: Option<String>,
}

/// A page known to the crawl
#[derive(Debug)]
pub struct Page {
    uri: Url,
    key: String,
    data: Mutex<PageData>,
}

impl Page {
    /// Creates a page in the `Wait` state
    pub fn new(uri: Url) -> Self {
        let key = page_key(&uri);
        Self {
            uri,
            key,
            data: Mutex::new(PageData {
                state: PageState::Wait,
                content: None,
                error: None,
            }),
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Identity key used for deduplication
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> PageState {
        self.data().state
    }

    pub fn error(&self) -> Option<String> {
        self.data().error.clone()
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let data = self.data();
        PageSnapshot {
            uri: self.uri.to_string(),
            state: data.state,
            error: data.error.clone(),
        }
    }

    /// Moves a waiting page to `Process`
    ///
    /// Returns false if the page was not waiting.
    pub(crate) fn claim(&self) -> bool {
        let mut data = self.data();
        if data.state != PageState::Wait {
            return false;
        }
        data.state = PageState::Process;
        true
    }

    /// Downloads the page content
    ///
    /// On failure the page ends up in `Error` with a readable message. The
    /// caller can always inspect `state()` afterwards.
    pub async fn fetch(&self, transport: &dyn Transport, cancel: &CancellationToken) {
        if let Err(e) = self.transition(PageState::Downloading) {
            tracing::warn!("Refusing to fetch {}: {}", self.uri, e);
            return;
        }

        match transport.fetch(&self.uri, cancel).await {
            Ok(content) => {
                self.data().content = Some(Arc::from(content));
            }
            Err(e) => {
                tracing::debug!("Fetch failed for {}: {}", self.uri, e);
                self.fail(e.to_string());
            }
        }
    }

    /// Searches the fetched content for `text`
    ///
    /// Case-sensitive. Returns false without touching the state if `text` is
    /// empty or nothing was fetched; otherwise records `Found` or `NotFound`.
    pub fn search(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let Some(content) = self.content() else {
            return false;
        };

        let found = content.contains(text);
        let next = if found {
            PageState::Found
        } else {
            PageState::NotFound
        };
        if let Err(e) = self.transition(next) {
            tracing::debug!("Search result not recorded for {}: {}", self.uri, e);
        }
        found
    }

    /// Extracts outbound links from the fetched content
    ///
    /// Hrefs are resolved against this page's scheme and authority; those that
    /// do not form an absolute URL are skipped. Duplicates are kept. If the
    /// parser rejects the markup altogether the page moves to `Error`.
    pub fn extract_links(&self, parser: &dyn LinkParser) -> Vec<Url> {
        let Some(content) = self.content() else {
            return Vec::new();
        };

        match parser.extract_hrefs(&content) {
            Ok(hrefs) => hrefs
                .iter()
                .filter_map(|href| resolve_href(&self.uri, href))
                .collect(),
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", self.uri, e);
                self.fail(e);
                Vec::new()
            }
        }
    }

    fn content(&self) -> Option<Arc<str>> {
        self.data()
            .content
            .clone()
            .filter(|content| !content.is_empty())
    }

    fn transition(&self, next: PageState) -> Result<(), SeekError> {
        let mut data = self.data();
        if !data.state.can_transition_to(next) {
            return Err(SeekError::InvalidTransition {
                from: data.state,
                to: next,
            });
        }
        data.state = next;
        Ok(())
    }

    fn fail(&self, message: String) {
        let mut data = self.data();
        data.state = PageState::Error;
        data.error = Some(message);
    }

    fn data(&self) -> MutexGuard<'_, PageData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

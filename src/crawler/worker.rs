//! Worker loop
//!
//! Each worker repeatedly waits out a pause, claims a page from the frontier,
//! fetches it, searches it, feeds its links back into the frontier and reports
//! progress. A panic inside one iteration is logged and the loop carries on;
//! only cancellation ends it.

use crate::crawler::events::ProgressReporter;
use crate::crawler::fetcher::Transport;
use crate::crawler::frontier::Frontier;
use crate::crawler::page::Page;
use crate::crawler::parser::LinkParser;
use crate::state::PageState;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Outcome of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Cancelled,
}

/// One member of the worker pool
pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) frontier: Arc<Frontier>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) parser: Arc<dyn LinkParser>,
    pub(crate) search_text: Arc<str>,
    pub(crate) politeness_delay: Duration,
    /// `true` while the crawl is paused
    pub(crate) pause_gate: watch::Receiver<bool>,
    pub(crate) cancel: CancellationToken,
    pub(crate) progress: Arc<ProgressReporter>,
}

impl Worker {
    /// Runs until the session is cancelled
    pub(crate) async fn run(mut self) {
        tracing::debug!(worker = self.id, "Worker started");

        while !self.cancel.is_cancelled() {
            match AssertUnwindSafe(self.iterate()).catch_unwind().await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Cancelled) => break,
                Err(panic) => {
                    tracing::error!(
                        worker = self.id,
                        "Worker iteration panicked: {}",
                        panic_message(panic.as_ref())
                    );
                }
            }
        }

        tracing::debug!(worker = self.id, "Worker exited");
    }

    async fn iterate(&mut self) -> Flow {
        if !self.wait_while_paused().await {
            return Flow::Cancelled;
        }

        // A stop issued during the pause must not let the worker carry on
        if self.cancel.is_cancelled() {
            return Flow::Cancelled;
        }

        let Some(page) = self.frontier.dequeue().await else {
            return Flow::Continue;
        };
        tracing::debug!(worker = self.id, "Processing {}", page.uri());

        page.fetch(self.transport.as_ref(), &self.cancel).await;
        if self.cancel.is_cancelled() {
            return Flow::Cancelled;
        }

        if page.state() == PageState::Error {
            tracing::warn!(
                "Failed to fetch {}: {}",
                page.uri(),
                page.error().unwrap_or_default()
            );
        } else {
            let cancelled = tokio::select! {
                _ = self.cancel.cancelled() => true,
                _ = tokio::time::sleep(self.politeness_delay) => false,
            };

            // The content is already here, so the page still gets its verdict
            if page.search(&self.search_text) {
                tracing::info!("Found \"{}\" on {}", self.search_text, page.uri());
            }
            if cancelled {
                return Flow::Cancelled;
            }

            let links = page.extract_links(self.parser.as_ref());
            let discovered = links.len();
            let added = links
                .into_iter()
                .filter(|uri| self.frontier.enqueue(Page::new(uri.clone())))
                .count();
            tracing::debug!(
                worker = self.id,
                "{}: {} links, {} new",
                page.uri(),
                discovered,
                added
            );
        }

        let percent = self.progress.report(&page);
        tracing::debug!(worker = self.id, "Progress {:.1}%", percent);
        Flow::Continue
    }

    /// Blocks while the pause gate is closed
    ///
    /// Returns false if the session was cancelled in the meantime.
    async fn wait_while_paused(&mut self) -> bool {
        loop {
            let paused = *self.pause_gate.borrow_and_update();
            if !paused {
                return true;
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return false,
                changed = self.pause_gate.changed() => {
                    if changed.is_err() {
                        return false;
                    }
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

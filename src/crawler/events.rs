//! Notifications published by a running crawl

use crate::crawler::page::{Page, PageSnapshot};
use crate::state::CrawlState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the event channel before slow subscribers start lagging
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Event delivered to subscribers of a `Coordinator`
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    /// The session moved to a new lifecycle state
    StateChanged(CrawlState),

    /// Processed pages as a percentage of the page budget
    ///
    /// Can briefly exceed 100 when workers race past the budget.
    Progress(f64),

    /// A worker finished with a page, whatever the outcome
    PageProcessed(PageSnapshot),
}

/// Percentage of the budget represented by `processed` pages
pub fn progress_percent(processed: usize, max_pages: usize) -> f64 {
    if max_pages == 0 {
        return 0.0;
    }
    processed as f64 * 100.0 / max_pages as f64
}

/// Counts processed pages and publishes progress without blocking
#[derive(Debug)]
pub(crate) struct ProgressReporter {
    processed: Arc<AtomicUsize>,
    max_pages: usize,
    events: broadcast::Sender<CrawlEvent>,
}

impl ProgressReporter {
    pub(crate) fn new(
        processed: Arc<AtomicUsize>,
        max_pages: usize,
        events: broadcast::Sender<CrawlEvent>,
    ) -> Self {
        Self {
            processed,
            max_pages,
            events,
        }
    }

    /// Records one processed page and returns the new percentage
    pub(crate) fn report(&self, page: &Page) -> f64 {
        let processed = self.processed.fetch_add(1, Ordering::SeqCst) + 1;
        let percent = progress_percent(processed, self.max_pages);

        // Nobody listening is fine
        let _ = self.events.send(CrawlEvent::PageProcessed(page.snapshot()));
        let _ = self.events.send(CrawlEvent::Progress(percent));

        percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::testing::url;

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 10), 0.0);
        assert_eq!(progress_percent(5, 10), 50.0);
        assert_eq!(progress_percent(3, 3), 100.0);
        assert_eq!(progress_percent(4, 3), 400.0 / 3.0);
    }

    #[test]
    fn test_report_without_subscribers() {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let processed = Arc::new(AtomicUsize::new(0));
        let reporter = ProgressReporter::new(Arc::clone(&processed), 4, events);

        let page = Page::new(url("http://example.com/"));
        assert_eq!(reporter.report(&page), 25.0);
        assert_eq!(reporter.report(&page), 50.0);
        assert_eq!(processed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_report_publishes_page_then_progress() {
        let (events, mut rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let reporter = ProgressReporter::new(Arc::new(AtomicUsize::new(0)), 2, events);

        let page = Page::new(url("http://example.com/x"));
        reporter.report(&page);

        match rx.try_recv().unwrap() {
            CrawlEvent::PageProcessed(snapshot) => {
                assert_eq!(snapshot.uri, "http://example.com/x")
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(rx.try_recv().unwrap(), CrawlEvent::Progress(50.0));
    }
}

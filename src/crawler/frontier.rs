//! Frontier: the bounded, deduplicating page collection
//!
//! Every known page lives here in insertion order. Workers claim pages by
//! scanning for the first one still in `Wait`; a worker that finds nothing
//! parks on a wake semaphore until an enqueue signals that work may exist,
//! then returns empty-handed and rescans on its next iteration. The semaphore
//! never hands out pages itself, so spurious wakeups and steals between
//! workers are harmless.

use crate::crawler::page::{Page, PageSnapshot};
use crate::{ConfigError, ConfigResult};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

#[derive(Debug, Default)]
struct FrontierInner {
    pages: Vec<Arc<Page>>,
    keys: HashSet<String>,
    idle_workers: usize,
}

/// Bounded page queue shared by all workers of one crawl session
#[derive(Debug)]
pub struct Frontier {
    /// Maximum number of concurrent workers
    slots: usize,

    /// Maximum number of stored pages
    capacity: usize,

    inner: Mutex<FrontierInner>,

    /// Wake signal for parked workers, holding at most `slots` permits
    wake: Semaphore,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `slots` - Number of workers that will share the frontier
    /// * `capacity` - Maximum number of pages ever stored
    ///
    /// # Returns
    ///
    /// * `Ok(Frontier)` - The frontier
    /// * `Err(ConfigError)` - A bound is zero, or `slots` exceeds `capacity`
    pub fn new(slots: usize, capacity: usize) -> ConfigResult<Self> {
        if slots == 0 {
            return Err(ConfigError::NonPositive("slots"));
        }
        if capacity == 0 {
            return Err(ConfigError::NonPositive("capacity"));
        }
        if slots > capacity {
            return Err(ConfigError::WorkersExceedPages {
                workers: slots,
                pages: capacity,
            });
        }

        Ok(Self {
            slots,
            capacity,
            inner: Mutex::new(FrontierInner::default()),
            wake: Semaphore::new(0),
        })
    }

    /// Adds a page unless the frontier is full or already knows it
    ///
    /// Rejections are silent: the crawl keeps running, it just stops growing.
    ///
    /// # Returns
    ///
    /// `true` if the page was stored
    pub fn enqueue(&self, page: Page) -> bool {
        let mut inner = self.lock();

        if inner.pages.len() >= self.capacity {
            tracing::trace!("Frontier full, dropping {}", page.uri());
            return false;
        }

        if !inner.keys.insert(page.key().to_string()) {
            tracing::trace!("Already known, dropping {}", page.uri());
            return false;
        }

        tracing::debug!("Enqueued {}", page.uri());
        inner.pages.push(Arc::new(page));
        self.give_slot();
        true
    }

    /// Claims the first waiting page
    ///
    /// If a page in `Wait` exists it is moved to `Process` and returned at
    /// once. Otherwise the caller is counted as idle and parks until a wake
    /// signal arrives or the frontier is closed, then gets `None` and is
    /// expected to try again.
    pub async fn dequeue(&self) -> Option<Arc<Page>> {
        let _idle = {
            let mut inner = self.lock();
            if let Some(page) = inner.pages.iter().find(|page| page.claim()) {
                return Some(Arc::clone(page));
            }
            inner.idle_workers += 1;
            IdleGuard(self)
        };

        self.wait_page().await;
        None
    }

    /// Releases every parked worker and makes future waits return at once
    ///
    /// Used on cancellation so no worker stays parked.
    pub fn close(&self) {
        self.wake.close();
    }

    pub fn is_closed(&self) -> bool {
        self.wake.is_closed()
    }

    /// Number of workers currently parked waiting for work
    pub fn idle_workers(&self) -> usize {
        self.lock().idle_workers
    }

    pub fn len(&self) -> usize {
        self.lock().pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Copies the current pages in insertion order
    pub fn snapshot(&self) -> Vec<PageSnapshot> {
        self.lock().pages.iter().map(|page| page.snapshot()).collect()
    }

    /// Signals a parked worker, without letting permits pile up past `slots`
    fn give_slot(&self) {
        if self.wake.available_permits() < self.slots {
            self.wake.add_permits(1);
        }
    }

    async fn wait_page(&self) {
        // A closed semaphore means the crawl is being cancelled
        if let Ok(permit) = self.wake.acquire().await {
            permit.forget();
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps a worker counted as idle for as long as it is parked
struct IdleGuard<'a>(&'a Frontier);

impl Drop for IdleGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.0.lock();
        inner.idle_workers = inner.idle_workers.saturating_sub(1);
    }
}

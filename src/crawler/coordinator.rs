//! Crawl controller - session lifecycle and worker pool orchestration
//!
//! The coordinator owns one crawl session at a time. It validates the start
//! arguments, builds a fresh frontier seeded with the start page, spawns the
//! worker pool and an idle monitor, and drives the session state machine:
//!
//! ```text
//! Ready/Stopped -> Starting -> Work <-> Paused
//!                     |         |        |
//!                     +-------> Stopping <+
//!                                  |
//!                               Stopped
//! ```
//!
//! Every transition happens under the state lock and is published before the
//! lock is released, so observers never see interleaved states.

use crate::config::{Config, FinderConfig};
use crate::crawler::events::{
    progress_percent, CrawlEvent, ProgressReporter, EVENT_CHANNEL_CAPACITY,
};
use crate::crawler::fetcher::{HttpTransport, Transport};
use crate::crawler::frontier::Frontier;
use crate::crawler::page::{Page, PageSnapshot};
use crate::crawler::parser::{HtmlLinkParser, LinkParser};
use crate::crawler::worker::Worker;
use crate::state::CrawlState;
use crate::url::parse_start_uri;
use crate::{ConfigError, ConfigResult, SeekError};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Handle to a crawl controller
///
/// Cloning the handle shares the same controller.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    settings: Mutex<FinderConfig>,
    transport: Arc<dyn Transport>,
    parser: Arc<dyn LinkParser>,

    state: Mutex<CrawlState>,
    state_tx: watch::Sender<CrawlState>,
    events: broadcast::Sender<CrawlEvent>,

    /// `true` closes the gate workers check before each dequeue
    pause_tx: watch::Sender<bool>,

    processed: Arc<AtomicUsize>,
    /// Page budget of the current or last session
    budget: AtomicUsize,

    frontier: Mutex<Option<Arc<Frontier>>>,
    session: Mutex<Option<Session>>,
    next_session_id: AtomicU64,
    disposed: AtomicBool,
}

/// Resources of one running session
struct Session {
    id: u64,
    cancel: CancellationToken,
    frontier: Arc<Frontier>,
    workers: Vec<JoinHandle<()>>,
    monitor: JoinHandle<()>,
}

impl Coordinator {
    /// Creates an idle coordinator in the `Ready` state
    ///
    /// # Arguments
    ///
    /// * `settings` - Page budget, worker count and timings
    /// * `transport` - Fetches page content
    /// * `parser` - Extracts hrefs from fetched content
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - The coordinator
    /// * `Err(ConfigError)` - A setting is out of range
    pub fn new(
        settings: FinderConfig,
        transport: Arc<dyn Transport>,
        parser: Arc<dyn LinkParser>,
    ) -> ConfigResult<Self> {
        crate::config::validate_finder_config(&settings)?;

        let (state_tx, _) = watch::channel(CrawlState::Ready);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (pause_tx, _) = watch::channel(false);
        let budget = AtomicUsize::new(settings.max_pages);

        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                settings: Mutex::new(settings),
                transport,
                parser,
                state: Mutex::new(CrawlState::Ready),
                state_tx,
                events,
                pause_tx,
                processed: Arc::new(AtomicUsize::new(0)),
                budget,
                frontier: Mutex::new(None),
                session: Mutex::new(None),
                next_session_id: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
            }),
        })
    }

    /// Creates a coordinator using the HTTP transport and HTML parser
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sumi_seek::{Config, Coordinator};
    ///
    /// # async fn example() -> Result<(), sumi_seek::SeekError> {
    /// let coordinator = Coordinator::from_config(&Config::default())?;
    /// coordinator.start("https://example.com/", "contact").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let transport = HttpTransport::from_config(&config.user_agent, &config.http)?;
        Ok(Self::new(
            config.finder.clone(),
            Arc::new(transport),
            Arc::new(HtmlLinkParser),
        )?)
    }

    /// Starts a crawl session from `uri`, searching every page for `search_text`
    ///
    /// Returns once the worker pool is running; the session then proceeds on
    /// its own until the frontier runs dry or `stop` is called.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The session is running, or a start is already underway
    /// * `Err(SeekError::AlreadyRunning)` - A session is running or stopping
    /// * `Err(SeekError::Config)` - The arguments or settings were rejected;
    ///   the state is left at `Stopped`
    pub async fn start(&self, uri: &str, search_text: &str) -> crate::Result<()> {
        self.check_disposed()?;
        let inner = &self.inner;

        {
            let mut state = inner.lock_state();
            if *state == CrawlState::Starting {
                return Ok(());
            }
            if !state.can_start() {
                return Err(SeekError::AlreadyRunning(*state));
            }
            inner.set_state(&mut state, CrawlState::Starting);
        }

        let settings = inner.settings();
        let (start_uri, search_text) = match check_start_arguments(&settings, uri, search_text) {
            Ok(arguments) => arguments,
            Err(e) => {
                tracing::warn!("Rejected crawl start: {}", e);
                inner.transition(CrawlState::Stopped);
                return Err(e.into());
            }
        };

        inner.processed.store(0, Ordering::SeqCst);
        inner.budget.store(settings.max_pages, Ordering::SeqCst);
        let _ = inner.events.send(CrawlEvent::Progress(0.0));

        tracing::info!(
            "Starting crawl of {} for \"{}\" ({} workers, {} pages)",
            start_uri,
            search_text,
            settings.max_workers,
            settings.max_pages
        );

        if let Err(e) = self.launch(&settings, start_uri, search_text) {
            tracing::error!("Failed to start crawl: {}", e);
            inner.stop(None).await;
            return Err(e);
        }

        inner.enter_work().await;
        Ok(())
    }

    /// Stops the running session and waits for every worker to exit
    ///
    /// Does nothing unless the session is `Starting`, `Work` or `Paused`.
    pub async fn stop(&self) -> crate::Result<()> {
        self.check_disposed()?;
        self.inner.stop(None).await;
        Ok(())
    }

    /// Keeps workers from claiming new pages
    ///
    /// Fetches already in flight are allowed to finish. Only acts from `Work`.
    pub fn pause(&self) -> crate::Result<()> {
        self.check_disposed()?;
        let inner = &self.inner;

        let mut state = inner.lock_state();
        if *state == CrawlState::Work {
            inner.pause_tx.send_replace(true);
            inner.set_state(&mut state, CrawlState::Paused);
        }
        Ok(())
    }

    /// Releases all paused workers at once. Only acts from `Paused`.
    pub fn resume(&self) -> crate::Result<()> {
        self.check_disposed()?;
        let inner = &self.inner;

        let mut state = inner.lock_state();
        if *state == CrawlState::Paused {
            inner.pause_tx.send_replace(false);
            inner.set_state(&mut state, CrawlState::Work);
        }
        Ok(())
    }

    /// Stops any session and retires the coordinator
    ///
    /// Every later operation fails with `SeekError::Disposed`.
    pub async fn dispose(&self) {
        if self.inner.disposed.load(Ordering::SeqCst) {
            return;
        }
        self.inner.stop(None).await;
        self.inner.disposed.store(true, Ordering::SeqCst);
        tracing::debug!("Coordinator disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> CrawlState {
        *self.inner.lock_state()
    }

    /// Receiver that always holds the latest state
    pub fn watch_state(&self) -> watch::Receiver<CrawlState> {
        self.inner.state_tx.subscribe()
    }

    /// Subscribes to state, progress and page events
    pub fn subscribe(&self) -> broadcast::Receiver<CrawlEvent> {
        self.inner.events.subscribe()
    }

    /// Pages of the current or last session, in discovery order
    pub fn pages(&self) -> Vec<PageSnapshot> {
        lock(&self.inner.frontier)
            .as_ref()
            .map(|frontier| frontier.snapshot())
            .unwrap_or_default()
    }

    pub fn processed_pages(&self) -> usize {
        self.inner.processed.load(Ordering::SeqCst)
    }

    /// Processed pages as a percentage of the session's page budget
    pub fn progress(&self) -> f64 {
        progress_percent(
            self.processed_pages(),
            self.inner.budget.load(Ordering::SeqCst),
        )
    }

    pub fn settings(&self) -> FinderConfig {
        self.inner.settings()
    }

    /// Sets the page budget used by the next start
    pub fn set_max_pages(&self, max_pages: usize) -> crate::Result<()> {
        self.check_disposed()?;
        if max_pages == 0 {
            return Err(ConfigError::NonPositive("max_pages").into());
        }
        lock(&self.inner.settings).max_pages = max_pages;
        Ok(())
    }

    /// Sets the worker count used by the next start
    pub fn set_max_workers(&self, max_workers: usize) -> crate::Result<()> {
        self.check_disposed()?;
        if max_workers == 0 {
            return Err(ConfigError::NonPositive("max_workers").into());
        }
        lock(&self.inner.settings).max_workers = max_workers;
        Ok(())
    }

    /// Builds the frontier and spawns the workers and the idle monitor
    fn launch(
        &self,
        settings: &FinderConfig,
        start_uri: Url,
        search_text: Arc<str>,
    ) -> crate::Result<()> {
        let inner = &self.inner;

        let frontier = Arc::new(Frontier::new(settings.max_workers, settings.max_pages)?);
        frontier.enqueue(Page::new(start_uri));
        *lock(&inner.frontier) = Some(Arc::clone(&frontier));
        tracing::debug!(
            "Frontier ready: {} slots, capacity {}",
            frontier.slots(),
            frontier.capacity()
        );

        inner.pause_tx.send_replace(false);
        let cancel = CancellationToken::new();
        let progress = Arc::new(ProgressReporter::new(
            Arc::clone(&inner.processed),
            settings.max_pages,
            inner.events.clone(),
        ));

        let workers = (0..frontier.slots())
            .map(|id| {
                let worker = Worker {
                    id,
                    frontier: Arc::clone(&frontier),
                    transport: Arc::clone(&inner.transport),
                    parser: Arc::clone(&inner.parser),
                    search_text: Arc::clone(&search_text),
                    politeness_delay: settings.politeness_delay(),
                    pause_gate: inner.pause_tx.subscribe(),
                    cancel: cancel.clone(),
                    progress: Arc::clone(&progress),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        let id = inner.next_session_id.fetch_add(1, Ordering::SeqCst);
        let monitor = tokio::spawn(monitor_idle(
            Arc::downgrade(inner),
            id,
            Arc::clone(&frontier),
            frontier.slots(),
            settings.idle_check_interval(),
            cancel.clone(),
        ));

        *lock(&inner.session) = Some(Session {
            id,
            cancel,
            frontier,
            workers,
            monitor,
        });
        Ok(())
    }

    fn check_disposed(&self) -> crate::Result<()> {
        if self.is_disposed() {
            return Err(SeekError::Disposed);
        }
        Ok(())
    }
}

impl CoordinatorInner {
    fn lock_state(&self) -> MutexGuard<'_, CrawlState> {
        lock(&self.state)
    }

    fn settings(&self) -> FinderConfig {
        lock(&self.settings).clone()
    }

    fn take_session(&self) -> Option<Session> {
        lock(&self.session).take()
    }

    /// Changes the state and publishes it while the caller holds the lock
    fn set_state(&self, state: &mut CrawlState, next: CrawlState) {
        *state = next;
        self.state_tx.send_replace(next);
        let _ = self.events.send(CrawlEvent::StateChanged(next));
        tracing::info!("Crawl state: {}", next);
    }

    fn transition(&self, next: CrawlState) {
        let mut state = self.lock_state();
        self.set_state(&mut state, next);
    }

    fn transition_if(&self, expected: CrawlState, next: CrawlState) -> bool {
        let mut state = self.lock_state();
        if *state != expected {
            return false;
        }
        self.set_state(&mut state, next);
        true
    }

    /// Moves a freshly launched session from `Starting` to `Work`
    ///
    /// A stop that landed during the launch may have run before the session
    /// was stored; that session is shut down here instead.
    async fn enter_work(&self) {
        if self.transition_if(CrawlState::Starting, CrawlState::Work) {
            return;
        }
        if let Some(session) = self.take_session() {
            tracing::debug!("Session {} stopped while starting", session.id);
            session.shut_down().await;
        }
    }

    /// Stops the session, or only session `expected` when given
    async fn stop(&self, expected: Option<u64>) {
        {
            let mut state = self.lock_state();
            if !state.can_stop() {
                return;
            }
            if let Some(id) = expected {
                let current = lock(&self.session).as_ref().map(|session| session.id);
                if current != Some(id) {
                    return;
                }
            }
            self.set_state(&mut state, CrawlState::Stopping);
        }

        // Paused workers must see the cancellation
        self.pause_tx.send_replace(false);
        if let Some(session) = self.take_session() {
            session.shut_down().await;
        }

        self.transition(CrawlState::Stopped);
        tracing::info!(
            "Crawl stopped after {} pages",
            self.processed.load(Ordering::SeqCst)
        );
    }
}

impl Drop for CoordinatorInner {
    fn drop(&mut self) {
        let session = self
            .session
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = session {
            session.cancel.cancel();
            session.frontier.close();
        }
    }
}

impl Session {
    /// Cancels the session and waits for its tasks
    async fn shut_down(self) {
        self.cancel.cancel();
        self.frontier.close();

        for (id, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.await {
                tracing::error!("Worker {} terminated abnormally: {}", id, e);
            }
        }
        if let Err(e) = self.monitor.await {
            tracing::error!("Idle monitor terminated abnormally: {}", e);
        }
    }
}

/// Stops the session once every worker is parked on an empty frontier
///
/// Best effort: a worker about to enqueue links is not counted as idle, but
/// the check is not a strict termination proof.
async fn monitor_idle(
    owner: Weak<CoordinatorInner>,
    session_id: u64,
    frontier: Arc<Frontier>,
    workers: usize,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }

        if frontier.idle_workers() == workers {
            tracing::info!("All {} workers idle, frontier exhausted", workers);
            if let Some(inner) = owner.upgrade() {
                // Stopping joins this task, so it has to run elsewhere
                tokio::spawn(async move { inner.stop(Some(session_id)).await });
            }
            return;
        }
    }
}

fn check_start_arguments(
    settings: &FinderConfig,
    uri: &str,
    search_text: &str,
) -> ConfigResult<(Url, Arc<str>)> {
    if settings.max_workers > settings.max_pages {
        return Err(ConfigError::WorkersExceedPages {
            workers: settings.max_workers,
            pages: settings.max_pages,
        });
    }

    let start_uri = parse_start_uri(uri).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
    if search_text.is_empty() {
        return Err(ConfigError::EmptySearchText);
    }

    Ok((start_uri, Arc::from(search_text)))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

//! Start/stop control for background crawl runs
//!
//! A `CrawlController` owns at most one running crawl. Starting spawns the
//! coordinator on the tokio runtime and hands back the event receiver;
//! stopping sets a shared flag the coordinator checks between batches.

use crate::config::Config;
use crate::crawler::coordinator::Coordinator;
use crate::crawler::events::CrawlEvent;
use crate::state::CrawlSession;
use crate::storage::ArticleStore;
use crate::url::parse_seed;
use crate::ScribeError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

/// Cooperative stop flag shared between a controller and its coordinator
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the running crawl to stop after the current batch
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clears the flag before a new run
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives crawl runs in the background
pub struct CrawlController {
    config: Arc<Config>,
    store: Arc<dyn ArticleStore>,
    stop: StopSignal,
    handle: Option<JoinHandle<Result<CrawlSession, ScribeError>>>,
}

impl CrawlController {
    /// Creates an idle controller
    pub fn new(config: Arc<Config>, store: Arc<dyn ArticleStore>) -> Self {
        Self {
            config,
            store,
            stop: StopSignal::new(),
            handle: None,
        }
    }

    /// Returns true while a spawned run has not finished
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Returns a handle to the stop flag, e.g. for a Ctrl-C handler
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Starts a crawl from `seed` in the background
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(receiver)` - The run was spawned; events arrive on the receiver
    /// * `Err(ScribeError::EmptySeed)` - `seed` is empty or whitespace
    /// * `Err(ScribeError::AlreadyRunning)` - A run is still in progress
    /// * `Err(ScribeError::UrlError)` - `seed` is not an absolute http(s) URL
    pub fn start(&mut self, seed: &str) -> Result<UnboundedReceiver<CrawlEvent>, ScribeError> {
        if seed.trim().is_empty() {
            return Err(ScribeError::EmptySeed);
        }
        if self.is_running() {
            return Err(ScribeError::AlreadyRunning);
        }

        let seed = parse_seed(seed)?;
        self.stop.reset();

        let (tx, rx) = mpsc::unbounded_channel();
        let mut coordinator = Coordinator::new(
            Arc::clone(&self.config),
            Arc::clone(&self.store),
            tx,
            self.stop.clone(),
        )?;
        let session = CrawlSession::new(seed, self.config.crawler.page_budget);

        self.handle = Some(tokio::spawn(async move { coordinator.run(session).await }));
        Ok(rx)
    }

    /// Requests a stop; a no-op when nothing is running
    pub fn stop(&self) {
        if self.is_running() {
            tracing::info!("Stop requested, finishing current batch");
            self.stop.request();
        }
    }

    /// Starts a crawl when idle, requests a stop when running
    ///
    /// Returns the event receiver when a run was started.
    pub fn toggle(
        &mut self,
        seed: &str,
    ) -> Result<Option<UnboundedReceiver<CrawlEvent>>, ScribeError> {
        match self.start(seed) {
            Ok(rx) => Ok(Some(rx)),
            Err(ScribeError::AlreadyRunning) => {
                self.stop();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Waits for the current run to end and returns its final session
    pub async fn wait(&mut self) -> Result<Option<CrawlSession>, ScribeError> {
        match self.handle.take() {
            Some(handle) => Ok(Some(handle.await??)),
            None => Ok(None),
        }
    }
}

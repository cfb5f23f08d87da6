//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the run loop that ties the crawl together:
//! - Seeding the frontier and driving the session lifecycle
//! - Selecting batches within the concurrency width and page budget
//! - Fetching and parsing a batch concurrently
//! - Persisting articles and folding discovered links back into the frontier
//! - Emitting one event per processed URL

use crate::config::Config;
use crate::crawler::controller::StopSignal;
use crate::crawler::events::{CompletionReason, CrawlEvent};
use crate::crawler::scheduler::{QueuedUrl, Scheduler};
use crate::crawler::{build_http_client, fetch_page, parse_article, ExtractionRules, FetchError};
use crate::state::{CrawlPhase, CrawlSession};
use crate::storage::{ArticleRecord, ArticleStore};
use crate::url::is_same_host;
use crate::ScribeError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use url::Url;

/// Result of processing one URL of a batch
enum PageOutcome {
    /// Fetched and parsed in this run
    Fetched(ArticleRecord),

    /// Served from the store without a network call
    Cached(ArticleRecord),

    Failed(FetchError),
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    store: Arc<dyn ArticleStore>,
    scheduler: Scheduler,
    client: Client,
    rules: Arc<ExtractionRules>,
    events: UnboundedSender<CrawlEvent>,
    stop: StopSignal,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `store` - Article cache shared with search
    /// * `events` - Channel receiving crawl events
    /// * `stop` - Stop flag observed at batch boundaries
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ScribeError)` - Extraction hints or the HTTP client are invalid
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn ArticleStore>,
        events: UnboundedSender<CrawlEvent>,
        stop: StopSignal,
    ) -> Result<Self, ScribeError> {
        let rules = ExtractionRules::compile(&config.extraction)?;
        let timeout = Duration::from_secs(config.crawler.request_timeout_secs);
        let client = build_http_client(&config.user_agent, timeout)?;
        let scheduler = Scheduler::new(config.crawler.ordering);

        Ok(Self {
            config,
            store,
            scheduler,
            client,
            rules: Arc::new(rules),
            events,
            stop,
        })
    }

    /// Runs one crawl from the session's seed until the frontier is empty,
    /// the budget is reached or a stop is requested
    ///
    /// The session is returned in `Idle` with its final page count.
    pub async fn run(&mut self, mut session: CrawlSession) -> Result<CrawlSession, ScribeError> {
        session.begin()?;
        self.scheduler.reset(session.seed.clone());

        tracing::info!(
            "Starting crawl of {} (budget: {})",
            session.seed,
            session
                .page_budget
                .map_or_else(|| "unbounded".to_string(), |b| b.to_string())
        );
        self.emit(CrawlEvent::Started {
            seed: session.seed.to_string(),
            budget: session.page_budget,
        });

        let batch_delay = Duration::from_millis(self.config.crawler.batch_delay_ms);

        let reason = loop {
            if self.stop.is_requested() {
                break CompletionReason::Stopped;
            }
            if session.budget_exhausted() {
                break CompletionReason::BudgetReached;
            }
            if self.scheduler.is_empty() {
                break CompletionReason::FrontierExhausted;
            }

            let mut width = self.config.crawler.concurrency as usize;
            if let Some(remaining) = session.remaining_budget() {
                width = width.min(remaining as usize);
            }

            let batch = self.scheduler.next_batch(width);
            if batch.is_empty() {
                continue;
            }

            tracing::debug!(
                "Dispatching batch of {} ({} queued, {} visited)",
                batch.len(),
                self.scheduler.frontier_size(),
                self.scheduler.visited_count()
            );

            let outcomes = self.dispatch(batch).await;

            let stopping = self.stop.is_requested();
            if stopping && session.phase == CrawlPhase::Running {
                session.transition(CrawlPhase::Stopping)?;
            }

            for (queued, outcome) in outcomes {
                self.handle_outcome(&mut session, &queued.url, outcome, !stopping)
                    .await;
            }

            if stopping {
                break CompletionReason::Stopped;
            }

            if !session.budget_exhausted() && !self.scheduler.is_empty() && !batch_delay.is_zero() {
                tokio::time::sleep(batch_delay).await;
            }
        };

        session.transition(CrawlPhase::Idle)?;

        let elapsed_secs = session
            .started_at
            .map_or(0, |start| (chrono::Utc::now() - start).num_seconds());
        tracing::info!(
            "Crawl finished ({}): {} pages in {}s",
            reason,
            session.pages_crawled,
            elapsed_secs
        );

        self.emit(CrawlEvent::Completed {
            pages_crawled: session.pages_crawled,
            reason,
        });

        Ok(session)
    }

    /// Processes one batch: cached URLs are answered from the store, the
    /// rest are fetched and parsed concurrently
    ///
    /// Outcomes come back in completion order, cache hits first.
    async fn dispatch(&self, batch: Vec<QueuedUrl>) -> Vec<(QueuedUrl, PageOutcome)> {
        let mut outcomes = Vec::with_capacity(batch.len());
        let mut tasks = JoinSet::new();

        for queued in batch {
            if let Some(record) = self.store.get(queued.url.as_str()) {
                tracing::debug!("Cache hit for {}", queued.url);
                outcomes.push((queued, PageOutcome::Cached(record)));
                continue;
            }

            let client = self.client.clone();
            let rules = Arc::clone(&self.rules);
            tasks.spawn(async move {
                tracing::debug!("Fetching {}", queued.url);
                let outcome = match fetch_page(&client, &queued.url).await {
                    Ok(page) => {
                        if page.final_url != page.url {
                            tracing::debug!("{} redirected to {}", page.url, page.final_url);
                        }
                        PageOutcome::Fetched(parse_article(&page.url, &page.body, &rules))
                    }
                    Err(e) => PageOutcome::Failed(e),
                };
                (queued, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => outcomes.push(result),
                Err(e) => tracing::error!("Fetch task failed: {}", e),
            }
        }

        outcomes
    }

    /// Counts a processed URL, persists new articles, folds links and
    /// emits the matching events
    ///
    /// The store write runs on the blocking pool; the loop waits for it
    /// before touching the next outcome.
    async fn handle_outcome(
        &mut self,
        session: &mut CrawlSession,
        url: &Url,
        outcome: PageOutcome,
        fold_links: bool,
    ) {
        session.record_page();
        self.emit(CrawlEvent::Progress {
            pages_crawled: session.pages_crawled,
            budget: session.page_budget,
            url: url.to_string(),
        });

        let (record, from_cache) = match outcome {
            PageOutcome::Fetched(record) => {
                if let Err(message) = self.persist(record.clone()).await {
                    tracing::error!("Failed to persist {}: {}", url, message);
                    self.emit_error(session, url, format!("{}: {}", url, message));
                }
                (record, false)
            }
            PageOutcome::Cached(record) => (record, true),
            PageOutcome::Failed(e) => {
                tracing::warn!("Fetch failed: {}", e);
                self.emit_error(session, url, e.to_string());
                return;
            }
        };

        if fold_links {
            let added = self.fold_links(&session.seed, &record);
            tracing::debug!("{} yielded {} new frontier URLs", url, added);
        }

        self.emit(CrawlEvent::ArticleReady {
            pages_crawled: session.pages_crawled,
            budget: session.page_budget,
            record,
            from_cache,
        });
    }

    /// Upserts `record` on the blocking pool, since it rewrites and syncs the
    /// whole cache file
    async fn persist(&self, record: ArticleRecord) -> Result<(), String> {
        let store = Arc::clone(&self.store);
        match tokio::task::spawn_blocking(move || store.upsert(record)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("store task failed: {}", e)),
        }
    }

    /// Adds the record's same-host links to the frontier, carrying any
    /// cached publish date for prioritized ordering
    fn fold_links(&mut self, seed: &Url, record: &ArticleRecord) -> usize {
        let mut added = 0;

        for link in &record.links {
            let Ok(url) = Url::parse(link) else {
                continue;
            };
            if !is_same_host(seed, &url) {
                continue;
            }
            if self.scheduler.is_visited(url.as_str()) || self.scheduler.is_queued(url.as_str()) {
                continue;
            }

            let published_at = self
                .store
                .get(url.as_str())
                .and_then(|cached| cached.published_at());

            if self.scheduler.add_to_frontier(url, published_at) {
                added += 1;
            }
        }

        added
    }

    fn emit_error(&self, session: &CrawlSession, url: &Url, message: String) {
        self.emit(CrawlEvent::Error {
            pages_crawled: session.pages_crawled,
            budget: session.page_budget,
            url: url.to_string(),
            message,
        });
    }

    fn emit(&self, event: CrawlEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("Event receiver dropped");
        }
    }
}

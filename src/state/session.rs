use crate::state::CrawlPhase;
use crate::ScribeError;
use chrono::{DateTime, Utc};
use url::Url;

/// State of one crawl run
///
/// The session is owned by whoever drives the run loop; it is passed into the
/// coordinator and handed back when the run ends, so no other component holds
/// mutable crawl counters.
#[derive(Debug, Clone)]
pub struct CrawlSession {
    /// Seed URL the run started from
    pub seed: Url,

    /// Current lifecycle phase
    pub phase: CrawlPhase,

    /// Pages processed so far (successes, failures and cache hits)
    pub pages_crawled: u64,

    /// Maximum pages for this run; `None` means unbounded
    pub page_budget: Option<u64>,

    /// When the session entered `Running`
    pub started_at: Option<DateTime<Utc>>,
}

impl CrawlSession {
    /// Creates an idle session for the given seed
    pub fn new(seed: Url, page_budget: Option<u64>) -> Self {
        Self {
            seed,
            phase: CrawlPhase::Idle,
            pages_crawled: 0,
            page_budget,
            started_at: None,
        }
    }

    /// Moves the session to `to`, rejecting transitions the lifecycle forbids
    pub fn transition(&mut self, to: CrawlPhase) -> Result<(), ScribeError> {
        if !self.phase.can_transition_to(to) {
            return Err(ScribeError::InvalidTransition {
                from: self.phase,
                to,
            });
        }

        tracing::debug!("Crawl phase {} -> {}", self.phase, to);
        self.phase = to;
        Ok(())
    }

    /// Enters `Running` and resets the page counter
    pub fn begin(&mut self) -> Result<(), ScribeError> {
        self.transition(CrawlPhase::Running)?;
        self.pages_crawled = 0;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Counts one processed page
    pub fn record_page(&mut self) {
        self.pages_crawled += 1;
    }

    /// Returns true once the page counter has reached the budget
    pub fn budget_exhausted(&self) -> bool {
        self.page_budget
            .is_some_and(|budget| self.pages_crawled >= budget)
    }

    /// Pages left before the budget is reached; `None` when unbounded
    pub fn remaining_budget(&self) -> Option<u64> {
        self.page_budget
            .map(|budget| budget.saturating_sub(self.pages_crawled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = CrawlSession::new(seed(), Some(10));
        assert_eq!(session.phase, CrawlPhase::Idle);
        assert_eq!(session.pages_crawled, 0);
        assert!(session.started_at.is_none());
    }

    #[test]
    fn test_begin_resets_counter() {
        let mut session = CrawlSession::new(seed(), None);
        session.pages_crawled = 7;
        session.begin().unwrap();

        assert_eq!(session.phase, CrawlPhase::Running);
        assert_eq!(session.pages_crawled, 0);
        assert!(session.started_at.is_some());
    }

    #[test]
    fn test_invalid_transition() {
        let mut session = CrawlSession::new(seed(), None);
        let err = session.transition(CrawlPhase::Stopping).unwrap_err();
        assert!(matches!(
            err,
            ScribeError::InvalidTransition {
                from: CrawlPhase::Idle,
                to: CrawlPhase::Stopping
            }
        ));
        assert_eq!(session.phase, CrawlPhase::Idle);
    }

    #[test]
    fn test_budget_tracking() {
        let mut session = CrawlSession::new(seed(), Some(2));
        session.begin().unwrap();
        assert_eq!(session.remaining_budget(), Some(2));
        assert!(!session.budget_exhausted());

        session.record_page();
        session.record_page();
        assert_eq!(session.remaining_budget(), Some(0));
        assert!(session.budget_exhausted());
    }

    #[test]
    fn test_unbounded_budget() {
        let mut session = CrawlSession::new(seed(), None);
        session.begin().unwrap();
        for _ in 0..1000 {
            session.record_page();
        }
        assert!(!session.budget_exhausted());
        assert_eq!(session.remaining_budget(), None);
    }
}

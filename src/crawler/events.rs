//! Events emitted by a crawl run
//!
//! The coordinator sends these over an unbounded channel; consumers drain it
//! at their own pace.

use crate::storage::ArticleRecord;
use std::fmt;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// No URLs left to visit
    FrontierExhausted,
    /// The page budget was reached
    BudgetReached,
    /// A stop was requested
    Stopped,
}

impl fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FrontierExhausted => "no pages left to crawl",
            Self::BudgetReached => "page budget reached",
            Self::Stopped => "stopped",
        };
        f.write_str(text)
    }
}

/// Crawl progress notification
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    /// The run entered `Running`
    Started { seed: String, budget: Option<u64> },

    /// A URL finished processing, whatever the outcome
    Progress {
        pages_crawled: u64,
        budget: Option<u64>,
        url: String,
    },

    /// An article was parsed, or served from the cache
    ArticleReady {
        pages_crawled: u64,
        budget: Option<u64>,
        record: ArticleRecord,
        from_cache: bool,
    },

    /// A URL could not be processed; `message` reads `url: cause`
    Error {
        pages_crawled: u64,
        budget: Option<u64>,
        url: String,
        message: String,
    },

    /// The run is back in `Idle`
    Completed {
        pages_crawled: u64,
        reason: CompletionReason,
    },
}

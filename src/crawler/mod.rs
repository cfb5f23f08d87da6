//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a per-request timeout
//! - Article extraction and same-host link discovery
//! - Frontier scheduling in prioritized or FIFO order
//! - Overall crawl coordination and start/stop control

mod controller;
mod coordinator;
mod events;
mod extraction;
mod fetcher;
mod parser;
mod scheduler;

pub use controller::{CrawlController, StopSignal};
pub use coordinator::Coordinator;
pub use events::{CompletionReason, CrawlEvent};
pub use extraction::ExtractionRules;
pub use fetcher::{build_http_client, fetch_page, FetchError, FetchErrorKind, RawPage};
pub use parser::{
    collapse_whitespace, make_preview, parse_article, parse_date, truncate_title, ELLIPSIS,
    MAX_PREVIEW_CHARS, MAX_TITLE_CHARS,
};
pub use scheduler::{QueuedUrl, Scheduler};

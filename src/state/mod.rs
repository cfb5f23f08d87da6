//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: Lifecycle phase of a run (idle, running, stopping)
//! - `CrawlSession`: Per-run counters and budget, passed through the run loop

mod crawl_phase;
mod session;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use session::CrawlSession;

/// Crawl phase definitions for the run lifecycle
///
/// A run moves `Idle -> Running -> Idle`, optionally passing through
/// `Stopping` when a stop is requested while pages are still in flight.
use std::fmt;

/// Represents the lifecycle phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlPhase {
    /// No crawl in progress; initial and terminal phase
    #[default]
    Idle,

    /// Batches are being selected and dispatched
    Running,

    /// Stop requested; the current batch is draining
    Stopping,
}

impl CrawlPhase {
    /// Returns true if the phase transition `self -> to` is allowed
    pub fn can_transition_to(&self, to: CrawlPhase) -> bool {
        matches!(
            (self, to),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Stopping)
                | (Self::Running, Self::Idle)
                | (Self::Stopping, Self::Idle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Scheduler for managing the crawl frontier
//!
//! This module handles:
//! - The frontier of URLs waiting to be fetched
//! - The visited set used for deduplication within a run
//! - Batch selection in prioritized or FIFO order
//!
//! A URL moves from the frontier to the visited set exactly once, at batch
//! selection, and is never queued again during the same run.

use crate::config::OrderingMode;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use url::Url;

/// A URL queued for fetching with priority information
#[derive(Debug, Clone)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: Url,

    /// Publish date known from the cache; always `None` in FIFO mode
    pub published_at: Option<DateTime<Utc>>,

    /// Discovery sequence number, lower was found earlier
    pub seq: u64,
}

// BinaryHeap pops the greatest element first:
// dated before undated, newer before older, then earlier discovery first
impl Ord for QueuedUrl {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.published_at, other.published_at) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedUrl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedUrl {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedUrl {}

/// Scheduler owns the frontier and the visited set of one run
pub struct Scheduler {
    /// Frontier priority queue of URLs to fetch
    frontier: BinaryHeap<QueuedUrl>,

    /// URLs currently in the frontier
    queued: HashSet<String>,

    /// URLs already dispatched in this run
    visited: HashSet<String>,

    ordering: OrderingMode,

    next_seq: u64,
}

impl Scheduler {
    /// Creates an empty scheduler
    pub fn new(ordering: OrderingMode) -> Self {
        Self {
            frontier: BinaryHeap::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            ordering,
            next_seq: 0,
        }
    }

    /// Clears the frontier and visited set and seeds the frontier
    pub fn reset(&mut self, seed: Url) {
        self.frontier.clear();
        self.queued.clear();
        self.visited.clear();
        self.next_seq = 0;
        self.add_to_frontier(seed, None);
    }

    /// Adds a URL to the frontier unless it is already queued or visited
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to add
    /// * `published_at` - Publish date known from the cache, used for
    ///   prioritized ordering
    ///
    /// # Returns
    ///
    /// True if the URL was added
    pub fn add_to_frontier(&mut self, url: Url, published_at: Option<DateTime<Utc>>) -> bool {
        let key = url.as_str();
        if self.visited.contains(key) || self.queued.contains(key) {
            return false;
        }

        let published_at = match self.ordering {
            OrderingMode::Prioritized => published_at,
            OrderingMode::Fifo => None,
        };

        self.queued.insert(key.to_string());
        self.frontier.push(QueuedUrl {
            url,
            published_at,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        true
    }

    /// Takes up to `max` URLs for the next batch and marks them visited
    pub fn next_batch(&mut self, max: usize) -> Vec<QueuedUrl> {
        let mut batch = Vec::with_capacity(max.min(self.frontier.len()));

        while batch.len() < max {
            let Some(queued) = self.frontier.pop() else {
                break;
            };

            let key = queued.url.as_str().to_string();
            self.queued.remove(&key);

            if !self.visited.insert(key) {
                tracing::trace!("Skipping already visited URL {}", queued.url);
                continue;
            }

            batch.push(queued);
        }

        batch
    }

    /// Returns true if `url` was dispatched in this run
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Returns true if `url` is waiting in the frontier
    pub fn is_queued(&self, url: &str) -> bool {
        self.queued.contains(url)
    }

    /// Returns the number of URLs in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns the number of URLs dispatched in this run
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }
}

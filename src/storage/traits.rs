//! Storage traits and error types
//!
//! This module defines the trait interface for article stores and
//! associated error types.

use crate::storage::ArticleRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to persist article cache to {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Article store lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for article store implementations
///
/// Implementations are shared between the crawl loop and search callers, so
/// every method takes `&self` and synchronizes internally. An `upsert` must be
/// observed by readers either completely or not at all.
pub trait ArticleStore: Send + Sync {
    /// Looks up the record cached for `url`
    fn get(&self, url: &str) -> Option<ArticleRecord>;

    /// Returns true if a record is cached for `url`
    fn contains(&self, url: &str) -> bool {
        self.get(url).is_some()
    }

    /// Inserts or replaces the record keyed by `record.url` and persists the
    /// whole mapping
    ///
    /// On error the in-memory mapping and the persisted file are both left as
    /// they were before the call.
    fn upsert(&self, record: ArticleRecord) -> StorageResult<()>;

    /// Number of cached records
    fn len(&self) -> usize;

    /// Returns true if nothing is cached
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visits every record in insertion order under one consistent view
    fn scan(&self, visit: &mut dyn FnMut(&ArticleRecord));

    /// Snapshot of every record in insertion order
    fn records(&self) -> Vec<ArticleRecord> {
        let mut records = Vec::with_capacity(self.len());
        self.scan(&mut |record| records.push(record.clone()));
        records
    }
}

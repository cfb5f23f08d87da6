//! Storage module for the article cache
//!
//! This module handles:
//! - The `ArticleRecord` data model
//! - The `ArticleStore` trait shared by the crawler and search
//! - A JSON file backend with atomic write-then-rename persistence
//! - Recovery from a corrupted cache file

mod json_store;
mod traits;

pub use json_store::{load_all, JsonArticleStore, BACKUP_SUFFIX, CACHE_FILE_NAME};
pub use traits::{ArticleStore, StorageError, StorageResult};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// One parsed article page
///
/// `url`, `title` and `content` are required when reading a cache file;
/// the remaining fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Absolute URL the page was fetched from; the cache key
    pub url: String,

    /// Page title, at most 30 characters plus an ellipsis
    pub title: String,

    /// Publish date as RFC 3339 when it could be parsed, raw text otherwise
    #[serde(default)]
    pub publish_date: String,

    /// Whitespace-collapsed text of the main content region
    pub content: String,

    /// Leading slice of `content`, at most 200 characters plus an ellipsis
    #[serde(default)]
    pub preview: String,

    /// Same-host links found on the page
    #[serde(default)]
    pub links: BTreeSet<String>,

    /// When the page was successfully fetched
    #[serde(default = "Utc::now", deserialize_with = "deserialize_crawl_time")]
    pub crawl_time: DateTime<Utc>,
}

impl ArticleRecord {
    /// Publish date parsed back into a timestamp, if it is one
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.publish_date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Accepts RFC 3339 timestamps as well as naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// values, which are read as UTC
fn deserialize_crawl_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

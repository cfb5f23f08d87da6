//! Statistics over the article cache
//!
//! This module provides functionality for summarizing the cached corpus
//! and printing the summary.

use crate::storage::ArticleStore;

/// Corpus statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusStatistics {
    /// Number of cached articles
    pub total_articles: usize,

    /// Articles whose content region was found
    pub articles_with_content: usize,

    /// Articles carrying a publish date
    pub dated_articles: usize,

    /// Total same-host links across all articles
    pub total_links: usize,

    /// Mean content length in characters
    pub average_content_length: f64,
}

/// Computes statistics over every record in the store
pub fn corpus_statistics(store: &dyn ArticleStore) -> CorpusStatistics {
    let mut stats = CorpusStatistics::default();
    let mut total_chars = 0usize;

    store.scan(&mut |record| {
        stats.total_articles += 1;
        if !record.content.is_empty() {
            stats.articles_with_content += 1;
        }
        if !record.publish_date.is_empty() {
            stats.dated_articles += 1;
        }
        stats.total_links += record.links.len();
        total_chars += record.content.chars().count();
    });

    if stats.total_articles > 0 {
        stats.average_content_length = total_chars as f64 / stats.total_articles as f64;
    }

    stats
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CorpusStatistics) {
    println!("=== Article Cache Statistics ===\n");

    println!("  Cached articles: {}", stats.total_articles);
    println!("  With content: {}", stats.articles_with_content);
    println!("  With publish date: {}", stats.dated_articles);
    println!("  Links recorded: {}", stats.total_links);
    println!(
        "  Average length: {} characters",
        stats.average_content_length as u64
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ArticleRecord, JsonArticleStore};
    use chrono::Utc;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn record(url: &str, content: &str, date: &str, links: &[&str]) -> ArticleRecord {
        ArticleRecord {
            url: url.to_string(),
            title: "t".to_string(),
            publish_date: date.to_string(),
            content: content.to_string(),
            preview: content.to_string(),
            links: links.iter().map(|l| l.to_string()).collect::<BTreeSet<_>>(),
            crawl_time: Utc::now(),
        }
    }

    #[test]
    fn test_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = JsonArticleStore::open(dir.path()).unwrap();
        assert_eq!(corpus_statistics(&store), CorpusStatistics::default());
    }

    #[test]
    fn test_statistics() {
        let dir = TempDir::new().unwrap();
        let store = JsonArticleStore::open(dir.path()).unwrap();
        store
            .upsert(record("https://e.com/1", "abcd", "2024-01-01", &["https://e.com/2"]))
            .unwrap();
        store
            .upsert(record("https://e.com/2", "", "", &["https://e.com/1", "https://e.com/3"]))
            .unwrap();

        let stats = corpus_statistics(&store);
        assert_eq!(stats.total_articles, 2);
        assert_eq!(stats.articles_with_content, 1);
        assert_eq!(stats.dated_articles, 1);
        assert_eq!(stats.total_links, 3);
        assert_eq!(stats.average_content_length, 2.0);
    }
}

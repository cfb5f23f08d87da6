//! Keyword search over the article cache
//!
//! Search is a linear scan of the store in insertion order. A record matches
//! when its title or content contains the keyword, ignoring case.

use crate::storage::ArticleStore;

/// Note returned for an empty keyword
pub const EMPTY_KEYWORD_NOTE: &str = "Enter a keyword to search";

/// One matching article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub publish_date: String,

    /// The record's preview text, unchanged
    pub preview: String,

    /// Character offset of the first keyword occurrence in `preview`, if the
    /// keyword appears there at all
    pub highlight: Option<usize>,
}

/// Result of a search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Matches in store order
    pub hits: Vec<SearchHit>,

    /// Set when the query could not run, e.g. an empty keyword
    pub note: Option<String>,
}

impl SearchOutcome {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Finds every cached article whose title or content contains `keyword`
///
/// # Example
///
/// ```
/// use sumi_scribe::search;
/// use sumi_scribe::storage::JsonArticleStore;
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = JsonArticleStore::open(dir.path()).unwrap();
///
/// let outcome = search(&store, "   ");
/// assert!(outcome.hits.is_empty());
/// assert!(outcome.note.is_some());
/// ```
pub fn search(store: &dyn ArticleStore, keyword: &str) -> SearchOutcome {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return SearchOutcome {
            hits: Vec::new(),
            note: Some(EMPTY_KEYWORD_NOTE.to_string()),
        };
    }

    let needle = keyword.to_lowercase();
    let mut hits = Vec::new();

    store.scan(&mut |record| {
        if !record.title.to_lowercase().contains(&needle)
            && !record.content.to_lowercase().contains(&needle)
        {
            return;
        }

        hits.push(SearchHit {
            title: record.title.clone(),
            url: record.url.clone(),
            publish_date: record.publish_date.clone(),
            preview: record.preview.clone(),
            highlight: find_ignore_case(&record.preview, keyword),
        });
    });

    tracing::debug!("Search for '{}' matched {} articles", keyword, hits.len());

    SearchOutcome { hits, note: None }
}

/// Char offset of the first case-insensitive occurrence of `needle`
fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }

    let chars: Vec<char> = haystack.chars().collect();
    (0..chars.len()).find(|&start| {
        let mut lowered = chars[start..].iter().flat_map(|c| c.to_lowercase());
        needle.iter().all(|n| lowered.next() == Some(*n))
    })
}

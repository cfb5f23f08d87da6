//! Plain-text article mirror
//!
//! Every stored article is also written to `<cache_dir>/articles/<title>.txt`
//! so the corpus can be read without any tooling. These files are a
//! convenience copy; `articles.json` stays authoritative.

use crate::output::OutputResult;
use crate::storage::ArticleRecord;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Subdirectory of the cache directory holding the text files
pub const ARTICLES_DIR: &str = "articles";

/// Extension of the text files
pub const ARTICLE_FILE_EXTENSION: &str = "txt";

const FALLBACK_STEM: &str = "untitled";

/// Writes the text rendering of `record` and returns its path
///
/// # Arguments
///
/// * `cache_dir` - The cache directory; `articles/` is created inside it
/// * `record` - The article to render
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(OutputError)` - Failed to create the directory or write the file
pub fn write_article_file(cache_dir: &Path, record: &ArticleRecord) -> OutputResult<PathBuf> {
    let dir = cache_dir.join(ARTICLES_DIR);
    fs::create_dir_all(&dir)?;

    let path = dir.join(format!(
        "{}.{}",
        sanitize_file_stem(&record.title),
        ARTICLE_FILE_EXTENSION
    ));

    let mut file = File::create(&path)?;
    file.write_all(format_article_text(record).as_bytes())?;

    tracing::debug!("Wrote article file {}", path.display());
    Ok(path)
}

/// Keeps alphanumerics, spaces, hyphens and underscores of `title`
///
/// Falls back to `untitled` when nothing usable is left.
pub fn sanitize_file_stem(title: &str) -> String {
    let stem: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let stem = stem.trim();

    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem.to_string()
    }
}

/// Formats an article as plain text
pub fn format_article_text(record: &ArticleRecord) -> String {
    let mut text = String::new();

    text.push_str(&format!("Title: {}\n\n", record.title));
    text.push_str(&format!("Published: {}\n", record.publish_date));
    text.push_str(&format!("URL: {}\n\n", record.url));
    text.push_str("Content:\n");
    text.push_str(&record.content);
    text.push('\n');

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn sample() -> ArticleRecord {
        ArticleRecord {
            url: "https://example.com/post".to_string(),
            title: "Rust/Async: a tour…".to_string(),
            publish_date: "2024-05-01T00:00:00+00:00".to_string(),
            content: "Body text".to_string(),
            preview: "Body text".to_string(),
            links: BTreeSet::new(),
            crawl_time: Utc::now(),
        }
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("Rust/Async: a tour…"), "RustAsync a tour");
        assert_eq!(sanitize_file_stem("snake_case - title"), "snake_case - title");
        assert_eq!(sanitize_file_stem("日本語のタイトル"), "日本語のタイトル");
        assert_eq!(sanitize_file_stem("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_file_stem("?!*"), "untitled");
    }

    #[test]
    fn test_format_article_text() {
        let text = format_article_text(&sample());
        assert!(text.starts_with("Title: Rust/Async: a tour…\n"));
        assert!(text.contains("Published: 2024-05-01T00:00:00+00:00\n"));
        assert!(text.contains("URL: https://example.com/post\n"));
        assert!(text.ends_with("Content:\nBody text\n"));
    }

    #[test]
    fn test_write_article_file() {
        let dir = TempDir::new().unwrap();
        let path = write_article_file(dir.path(), &sample()).unwrap();

        assert_eq!(path, dir.path().join("articles").join("RustAsync a tour.txt"));
        let written = fs::read_to_string(path).unwrap();
        assert!(written.contains("Body text"));
    }
}

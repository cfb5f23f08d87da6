//! HTML parser for extracting article records
//!
//! This module turns a fetched page into an `ArticleRecord`:
//! - Title from the `<title>` element, truncated for display
//! - Publish date from the first date hint match
//! - Main content from the first content hint match, whitespace collapsed
//! - Preview derived from the content
//! - Same-host links from `<a href>` elements
//!
//! Parsing never fails. Missing or malformed markup leaves the affected field
//! at its default value.

use crate::crawler::ExtractionRules;
use crate::storage::ArticleRecord;
use crate::url::{canonicalize_link, is_same_host};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Appended to truncated titles and previews
pub const ELLIPSIS: &str = "…";

/// Maximum title length in characters before truncation
pub const MAX_TITLE_CHARS: usize = 30;

/// Maximum preview length in characters before truncation
pub const MAX_PREVIEW_CHARS: usize = 200;

/// Title used when the page has none
pub const UNTITLED: &str = "untitled";

/// Date/time layouts tried after RFC 3339 and RFC 2822
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

/// Date-only layouts; midnight UTC is assumed
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
    "%Y年%m月%d日",
];

/// Parses HTML content into an article record
///
/// # Arguments
///
/// * `url` - The URL the page was fetched from; used as the record key and as
///   the base for resolving links
/// * `html` - The raw HTML
/// * `rules` - Compiled extraction hints
///
/// # Example
///
/// ```
/// use sumi_scribe::config::ExtractionConfig;
/// use sumi_scribe::crawler::{parse_article, ExtractionRules};
/// use url::Url;
///
/// let rules = ExtractionRules::compile(&ExtractionConfig::default()).unwrap();
/// let url = Url::parse("https://example.com/post").unwrap();
/// let html = r#"<html><head><title>Hello</title></head>
///     <body><article>Some   text</article><a href="/next">next</a></body></html>"#;
///
/// let record = parse_article(&url, html, &rules);
/// assert_eq!(record.title, "Hello");
/// assert_eq!(record.content, "Some text");
/// assert!(record.links.contains("https://example.com/next"));
/// ```
pub fn parse_article(url: &Url, html: &str, rules: &ExtractionRules) -> ArticleRecord {
    let document = Html::parse_document(html);

    let title = truncate_title(extract_title(&document).as_deref().unwrap_or(UNTITLED));

    let publish_date = rules
        .date_selector()
        .and_then(|selector| document.select(selector).next())
        .map(extract_publish_date)
        .unwrap_or_default();

    let content = rules
        .content_selector()
        .and_then(|selector| document.select(selector).next())
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .unwrap_or_default();

    let preview = make_preview(&content);
    let links = extract_links(&document, url);

    ArticleRecord {
        url: url.to_string(),
        title,
        publish_date,
        content,
        preview,
        links,
        crawl_time: Utc::now(),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Reads the date text of a matched element and normalizes it when possible
///
/// Falls back to a `datetime` attribute (as on `<time>`) when the text is
/// not a recognizable date but the attribute is.
fn extract_publish_date(element: ElementRef<'_>) -> String {
    let text = collapse_whitespace(&element.text().collect::<String>());

    if let Some(parsed) = parse_date(&text) {
        return parsed.to_rfc3339();
    }

    if let Some(parsed) = element.value().attr("datetime").and_then(parse_date) {
        return parsed.to_rfc3339();
    }

    text
}

/// Best-effort conversion of a date string into a UTC timestamp
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}

/// Collects every same-host `<a href>` target as an absolute URL
fn extract_links(document: &Html, page_url: &Url) -> BTreeSet<String> {
    let mut links = BTreeSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(absolute) = canonicalize_link(href, page_url) {
            if is_same_host(page_url, &absolute) {
                links.insert(absolute.to_string());
            }
        }
    }

    links
}

/// Collapses every whitespace run to one space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates a title to 30 characters plus an ellipsis
pub fn truncate_title(title: &str) -> String {
    truncate_chars(title, MAX_TITLE_CHARS)
}

/// Builds the preview for `content`: the first 200 characters plus an
/// ellipsis, or the whole content when it is short enough
pub fn make_preview(content: &str) -> String {
    truncate_chars(content, MAX_PREVIEW_CHARS)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

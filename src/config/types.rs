use serde::Deserialize;

/// Main configuration structure for Sumi-Scribe
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// Order in which frontier URLs are picked for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingMode {
    /// URLs with a known publish date first (newest first), then the rest
    #[default]
    Prioritized,
    /// Plain discovery order
    Fifo,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of pages fetched concurrently in one batch
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Maximum pages processed in one run; `None` means unbounded
    #[serde(default)]
    pub page_budget: Option<u64>,

    /// Pause between batches (milliseconds)
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub ordering: OrderingMode,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            page_budget: None,
            batch_delay_ms: default_batch_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            ordering: OrderingMode::default(),
        }
    }
}

fn default_concurrency() -> u32 {
    5
}

fn default_batch_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiScribe".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/sumi-scribe/sumi-scribe".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory holding `articles.json` and the `articles/` text mirror
    pub cache_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            cache_dir: "cache".to_string(),
        }
    }
}

/// One row of an extraction hint table
///
/// Matches elements named `element` (any element when `None`) that carry the
/// class `class` (any class when `None`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ElementHint {
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
}

impl ElementHint {
    pub fn new(element: Option<&str>, class: Option<&str>) -> Self {
        Self {
            element: element.map(str::to_string),
            class: class.map(str::to_string),
        }
    }
}

/// Hint tables used by the page parser
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtractionConfig {
    /// Elements that may hold the publish date; the first one in document order wins
    #[serde(default = "default_date_hints")]
    pub date_hints: Vec<ElementHint>,

    /// Elements that may hold the article body; the first one in document order wins
    #[serde(default = "default_content_hints")]
    pub content_hints: Vec<ElementHint>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            date_hints: default_date_hints(),
            content_hints: default_content_hints(),
        }
    }
}

fn default_date_hints() -> Vec<ElementHint> {
    let mut hints = Vec::new();
    for element in ["time", "span", "div"] {
        for class in ["date", "time", "published", "post-date"] {
            hints.push(ElementHint::new(Some(element), Some(class)));
        }
    }
    hints
}

fn default_content_hints() -> Vec<ElementHint> {
    let mut hints = vec![ElementHint::new(Some("article"), None)];
    for class in ["post-content", "entry-content", "article-content"] {
        hints.push(ElementHint::new(Some("div"), Some(class)));
    }
    hints
}

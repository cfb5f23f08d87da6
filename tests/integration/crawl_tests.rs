//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive full crawl
//! runs through the `CrawlController`.

use std::collections::BTreeSet;
use std::sync::Arc;
use sumi_scribe::config::{Config, OrderingMode};
use sumi_scribe::crawler::{CompletionReason, CrawlController, CrawlEvent};
use sumi_scribe::state::{CrawlPhase, CrawlSession};
use sumi_scribe::storage::{ArticleRecord, ArticleStore, JsonArticleStore};
use sumi_scribe::ScribeError;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no inter-batch delay
fn create_test_config(page_budget: Option<u64>) -> Config {
    let mut config = Config::default();
    config.crawler.batch_delay_ms = 0;
    config.crawler.request_timeout_secs = 5;
    config.crawler.page_budget = page_budget;
    config
}

fn article_html(title: &str, body: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        r#"<html><head><title>{}</title></head><body>
        <div class="post-content">{}</div>
        {}
        </body></html>"#,
        title, body, anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

/// Runs one crawl to completion and collects every event
async fn run_crawl(
    config: Config,
    store: Arc<JsonArticleStore>,
    seed: &str,
) -> (Vec<CrawlEvent>, CrawlSession) {
    let mut controller = CrawlController::new(Arc::new(config), store);
    let mut rx = controller.start(seed).expect("crawl should start");

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    let session = controller
        .wait()
        .await
        .expect("crawl task should succeed")
        .expect("a run was started");
    (events, session)
}

fn completion_reason(events: &[CrawlEvent]) -> Option<CompletionReason> {
    events.iter().find_map(|e| match e {
        CrawlEvent::Completed { reason, .. } => Some(*reason),
        _ => None,
    })
}

fn ready_records(events: &[CrawlEvent]) -> Vec<(&ArticleRecord, bool)> {
    events
        .iter()
        .filter_map(|e| match e {
            CrawlEvent::ArticleReady {
                record, from_cache, ..
            } => Some((record, *from_cache)),
            _ => None,
        })
        .collect()
}

fn error_urls(events: &[CrawlEvent]) -> BTreeSet<String> {
    events
        .iter()
        .filter_map(|e| match e {
            CrawlEvent::Error { url, .. } => Some(url.clone()),
            _ => None,
        })
        .collect()
}

fn progress_urls(events: &[CrawlEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            CrawlEvent::Progress { url, .. } => Some(url.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_article_extracted_and_links_followed() {
    let server = MockServer::start().await;
    let base = server.uri();
    let body = "a".repeat(250);

    mount_page(
        &server,
        "/",
        article_html("Hello World Article Title Here", &body, &["/first", "/second"]),
    )
    .await;
    // Linked pages are missing; their Error events prove they were queued

    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonArticleStore::open(dir.path()).unwrap());
    let (events, session) = run_crawl(create_test_config(None), store.clone(), &format!("{}/", base)).await;

    let ready = ready_records(&events);
    assert_eq!(ready.len(), 1);
    let (record, from_cache) = ready[0];
    assert!(!from_cache);
    assert_eq!(record.url, format!("{}/", base));
    assert_eq!(record.title, "Hello World Article Title Here");
    assert_eq!(record.content.chars().count(), 250);
    assert_eq!(record.preview, format!("{}…", "a".repeat(200)));

    let expected_links: BTreeSet<String> = [format!("{}/first", base), format!("{}/second", base)]
        .into_iter()
        .collect();
    assert_eq!(record.links, expected_links);
    assert_eq!(error_urls(&events), expected_links);

    assert_eq!(session.pages_crawled, 3);
    assert_eq!(session.phase, CrawlPhase::Idle);
    assert_eq!(completion_reason(&events), Some(CompletionReason::FrontierExhausted));

    // Only the successful fetch is stored
    assert_eq!(store.len(), 1);
    assert!(store.contains(&format!("{}/", base)));
}

#[tokio::test]
async fn test_long_title_truncated() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        article_html("Hello World Article Title Here Again", "text", &[]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonArticleStore::open(dir.path()).unwrap());
    let (events, _) = run_crawl(create_test_config(None), store, &format!("{}/", server.uri())).await;

    let ready = ready_records(&events);
    assert_eq!(ready[0].0.title, "Hello World Article Title Here…");
}

#[tokio::test]
async fn test_page_budget_bounds_crawl() {
    let server = MockServer::start().await;
    let links: Vec<String> = (0..10).map(|i| format!("/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();

    mount_page(&server, "/", article_html("Index", "index", &link_refs)).await;
    for link in &links {
        mount_page(&server, link, article_html(link, "page", &[])).await;
    }

    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonArticleStore::open(dir.path()).unwrap());
    let (events, session) =
        run_crawl(create_test_config(Some(3)), store.clone(), &format!("{}/", server.uri())).await;

    assert_eq!(session.pages_crawled, 3);
    assert_eq!(progress_urls(&events).len(), 3);
    assert_eq!(store.len(), 3);
    assert_eq!(completion_reason(&events), Some(CompletionReason::BudgetReached));

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_each_url_visited_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/", article_html("Home", "home", &["/a", "/b"])).await;
    mount_page(&server, "/a", article_html("A", "a", &["/", "/b", "/a"])).await;
    mount_page(&server, "/b", article_html("B", "b", &["/", "/a"])).await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonArticleStore::open(dir.path()).unwrap());
    let (events, session) = run_crawl(create_test_config(None), store, &format!("{}/", server.uri())).await;

    let urls = progress_urls(&events);
    let unique: BTreeSet<_> = urls.iter().cloned().collect();
    assert_eq!(urls.len(), unique.len());
    assert_eq!(session.pages_crawled, 3);
}

#[tokio::test]
async fn test_other_origin_links_not_followed() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>elsewhere</title>"))
        .expect(0)
        .mount(&other)
        .await;

    let offsite = format!("{}/offsite", other.uri());
    mount_page(
        &server,
        "/",
        article_html("Home", "home", &[offsite.as_str(), "https://elsewhere.invalid/x", "/local"]),
    )
    .await;
    mount_page(&server, "/local", article_html("Local", "local", &[])).await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonArticleStore::open(dir.path()).unwrap());
    let (events, session) = run_crawl(create_test_config(None), store, &format!("{}/", server.uri())).await;

    assert_eq!(session.pages_crawled, 2);
    for url in progress_urls(&events) {
        assert!(url.starts_with(&server.uri()), "left the seed host: {}", url);
    }
}

#[tokio::test]
async fn test_cached_page_not_refetched() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>fresh</title>"))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/next", article_html("Next", "next page", &[])).await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonArticleStore::open(dir.path()).unwrap());
    let cached = ArticleRecord {
        url: seed.clone(),
        title: "Cached".to_string(),
        publish_date: String::new(),
        content: "from an earlier run".to_string(),
        preview: "from an earlier run".to_string(),
        links: [format!("{}/next", server.uri())].into_iter().collect(),
        crawl_time: chrono::Utc::now(),
    };
    store.upsert(cached.clone()).unwrap();

    let (events, session) = run_crawl(create_test_config(None), store.clone(), &seed).await;

    let ready = ready_records(&events);
    assert_eq!(ready.len(), 2);
    assert_eq!(ready[0].0, &cached);
    assert!(ready[0].1);
    assert_eq!(ready[1].0.title, "Next");
    assert!(!ready[1].1);

    assert_eq!(session.pages_crawled, 2);
    assert_eq!(store.get(&seed), Some(cached));
}

#[tokio::test]
async fn test_failed_fetch_reported_and_crawl_continues() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", article_html("Home", "home", &["/missing", "/ok"])).await;
    mount_page(&server, "/ok", article_html("Ok", "fine", &[])).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonArticleStore::open(dir.path()).unwrap());
    let (events, session) = run_crawl(create_test_config(None), store.clone(), &format!("{}/", base)).await;

    let message = events
        .iter()
        .find_map(|e| match e {
            CrawlEvent::Error { message, .. } => Some(message.clone()),
            _ => None,
        })
        .expect("an error event");
    assert!(message.starts_with(&format!("{}/missing: ", base)));
    assert!(message.contains("500"));

    assert_eq!(session.pages_crawled, 3);
    assert!(store.contains(&format!("{}/ok", base)));
    assert!(!store.contains(&format!("{}/missing", base)));
}

#[tokio::test]
async fn test_fifo_ordering_follows_discovery() {
    let server = MockServer::start().await;
    mount_page(&server, "/", article_html("Home", "home", &["/z", "/y", "/x"])).await;
    for p in ["/x", "/y", "/z"] {
        mount_page(&server, p, article_html(p, p, &[])).await;
    }

    let mut config = create_test_config(None);
    config.crawler.ordering = OrderingMode::Fifo;
    config.crawler.concurrency = 1;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonArticleStore::open(dir.path()).unwrap());
    let base = server.uri();
    let (events, _) = run_crawl(config, store, &format!("{}/", base)).await;

    // Links are kept sorted, so discovery order is x, y, z
    let expected: Vec<String> = ["/", "/x", "/y", "/z"]
        .iter()
        .map(|p| format!("{}{}", base, p))
        .collect();
    assert_eq!(progress_urls(&events), expected);
}

#[tokio::test]
async fn test_start_rejections() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonArticleStore::open(dir.path()).unwrap());
    let mut controller = CrawlController::new(Arc::new(create_test_config(None)), store);

    assert!(matches!(controller.start(""), Err(ScribeError::EmptySeed)));
    assert!(matches!(controller.start("not a url"), Err(ScribeError::UrlError(_))));
    assert!(!controller.is_running());
}

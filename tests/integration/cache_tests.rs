//! Integration tests for the article cache
//!
//! A crawl writes the cache; a fresh store opened on the same directory must
//! see the same corpus, as a later process would.

use std::fs;
use std::sync::Arc;
use sumi_scribe::config::Config;
use sumi_scribe::crawler::CrawlController;
use sumi_scribe::output::{corpus_statistics, ARTICLES_DIR};
use sumi_scribe::search;
use sumi_scribe::storage::{ArticleStore, JsonArticleStore, BACKUP_SUFFIX, CACHE_FILE_NAME};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, title: &str, body: &str, links: &[&str]) {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    let html = format!(
        r#"<html><head><title>{}</title></head><body>
        <time class="date">2024-03-05</time>
        <article>{}</article>{}</body></html>"#,
        title, body, anchors
    );

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

async fn crawl_into(dir: &TempDir, seed: &str) {
    let mut config = Config::default();
    config.crawler.batch_delay_ms = 0;

    let store = Arc::new(JsonArticleStore::open(dir.path()).unwrap());
    let mut controller = CrawlController::new(Arc::new(config), store);
    let mut rx = controller.start(seed).unwrap();
    while rx.recv().await.is_some() {}
    controller.wait().await.unwrap();
}

#[tokio::test]
async fn test_cache_survives_restart_and_is_searchable() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Gadget news", "A review of the new Widget 3000.", &["/other"]).await;
    mount_page(&server, "/other", "Gardening", "Tomatoes need sun.", &[]).await;

    let dir = TempDir::new().unwrap();
    crawl_into(&dir, &format!("{}/", server.uri())).await;

    let reopened = JsonArticleStore::open(dir.path()).unwrap();
    assert_eq!(reopened.len(), 2);

    let first = reopened.get(&format!("{}/", server.uri())).unwrap();
    assert_eq!(first.publish_date, "2024-03-05T00:00:00+00:00");

    let outcome = search(&reopened, "widget");
    assert_eq!(outcome.len(), 1);
    assert_eq!(outcome.hits[0].title, "Gadget news");
    assert_eq!(outcome.hits[0].highlight, Some(20));

    let stats = corpus_statistics(&reopened);
    assert_eq!(stats.total_articles, 2);
    assert_eq!(stats.dated_articles, 2);
}

#[tokio::test]
async fn test_article_text_files_written() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Plain Text Mirror", "Body text.", &[]).await;

    let dir = TempDir::new().unwrap();
    crawl_into(&dir, &format!("{}/", server.uri())).await;

    let text = fs::read_to_string(dir.path().join(ARTICLES_DIR).join("Plain Text Mirror.txt")).unwrap();
    assert!(text.starts_with("Title: Plain Text Mirror\n"));
    assert!(text.contains("Body text."));
}

#[tokio::test]
async fn test_corrupted_cache_recovered_then_rewritten() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CACHE_FILE_NAME), b"{\"https://example.com/\": {\"url\":").unwrap();

    let store = JsonArticleStore::open(dir.path()).unwrap();
    assert!(store.is_empty());

    let backups: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(CACHE_FILE_NAME) && name.ends_with(BACKUP_SUFFIX))
        .collect();
    assert_eq!(backups.len(), 1);
    drop(store);

    let server = MockServer::start().await;
    mount_page(&server, "/", "Fresh", "After recovery.", &[]).await;
    crawl_into(&dir, &format!("{}/", server.uri())).await;

    let reopened = JsonArticleStore::open(dir.path()).unwrap();
    assert_eq!(reopened.len(), 1);
}

//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a tiny encyclopedia and run the full
//! harvest end-to-end into a temporary SQLite database.

use tempfile::TempDir;
use wiki_harvest::config::{parse_config, Config};
use wiki_harvest::crawler::crawl;
use wiki_harvest::storage::{RunStatus, SqliteStorage, Storage};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a config pointing at the mock server
fn create_test_config(base_url: &str, db_path: &str, max_levels: u32) -> Config {
    let toml = format!(
        r#"
[crawler]
max-levels = {max_levels}
concurrency = 4
page-timeout-secs = 10

[site]
base-domain = "{base_url}"

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
database-path = "{db_path}"

[[seed]]
url = "{base_url}/wiki/Math"
tag = "math"

[[seed]]
url = "{base_url}/wiki/History"
tag = "hist"
"#
    );
    parse_config(&toml).expect("test config should be valid")
}

/// Wraps paragraphs and links in an article layout with a navigation bar
fn article(paragraphs: &[&str], links: &[&str]) -> String {
    let mut body = String::new();
    for p in paragraphs {
        body.push_str(&format!("<p>{}</p>\n", p));
    }
    for href in links {
        body.push_str(&format!("<a href=\"{}\">link</a>\n", href));
    }
    format!(
        r#"<html><head><title>Article</title></head><body>
        <div id="mw-navigation"><a href="/wiki/Nav_Only">Navigation</a></div>
        <div id="mw-content-text">{}</div>
        </body></html>"#,
        body
    )
}

async fn mount_page(server: &MockServer, page: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_never_fetched(server: &MockServer, page: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_string(article(&[], &[])))
        .expect(0)
        .mount(server)
        .await;
}

/// Math and History are seeds; Rome is missing; Ghost is two levels deep
async fn mount_encyclopedia(server: &MockServer) {
    mount_page(
        server,
        "/wiki/Math",
        article(
            &["Mathematics is an area of knowledge.", "Tiny"],
            &[
                "/wiki/Algebra",
                "/wiki/Category:Mathematics",
                "/wiki/History",
                "https://example.org/about",
            ],
        ),
    )
    .await;

    mount_page(
        server,
        "/wiki/History",
        article(
            &[
                "History is the study of the past.",
                "Writing began in ancient Sumer.",
            ],
            &["/wiki/Math", "/wiki/Rome"],
        ),
    )
    .await;

    mount_page(
        server,
        "/wiki/Algebra",
        article(&["Algebra uses letters for numbers."], &["/wiki/Ghost"]),
    )
    .await;

    mount_never_fetched(server, "/wiki/Nav_Only").await;
    mount_never_fetched(server, "/wiki/Category:Mathematics").await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_crawl_two_levels() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_encyclopedia(&mock_server).await;
    mount_never_fetched(&mock_server, "/wiki/Ghost").await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("harvest.db");
    let config = create_test_config(&base_url, db_path.to_str().unwrap(), 2);

    let report = crawl(config, "test-hash").await.expect("crawl should succeed");

    let dispatched: Vec<usize> = report.levels.iter().map(|l| l.dispatched).collect();
    assert_eq!(dispatched, vec![2, 2]);
    assert_eq!(report.levels[1].queued, 4);
    assert_eq!(report.stats.pages_crawled, 3);
    assert_eq!(report.stats.paragraphs, 4);
    assert_eq!(report.stats.pages_failed, 1);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_paragraphs().unwrap(), 4);
    assert_eq!(storage.count_distinct_urls().unwrap(), 3);
    assert_eq!(
        storage.list_url_tags().unwrap(),
        vec![
            (format!("{}/wiki/Algebra", base_url), "math".to_string()),
            (format!("{}/wiki/History", base_url), "hist".to_string()),
            (format!("{}/wiki/Math", base_url), "math".to_string()),
        ]
    );

    let run = storage.get_latest_run().unwrap().expect("run recorded");
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
    assert_eq!(run.max_levels, 2);
    assert_eq!(run.pages_crawled, 3);
    assert_eq!(run.paragraphs, 4);
    assert!(run.finished_at.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_level_only_crawls_seeds() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_encyclopedia(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("harvest.db");
    let mut config = create_test_config(&base_url, db_path.to_str().unwrap(), 2);
    config.crawler.max_levels = 1;

    let report = crawl(config, "test-hash").await.unwrap();

    assert_eq!(report.levels.len(), 1);
    assert_eq!(report.stats.pages_crawled, 2);
    assert_eq!(report.stats.paragraphs, 3);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_distinct_urls().unwrap(), 2);

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/wiki/Algebra"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rerun_appends_same_url_tags() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_encyclopedia(&mock_server).await;
    mount_never_fetched(&mock_server, "/wiki/Ghost").await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("harvest.db");

    crawl(
        create_test_config(&base_url, db_path.to_str().unwrap(), 2),
        "first",
    )
    .await
    .unwrap();
    let first_pairs = SqliteStorage::new(&db_path).unwrap().list_url_tags().unwrap();

    crawl(
        create_test_config(&base_url, db_path.to_str().unwrap(), 2),
        "second",
    )
    .await
    .unwrap();

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_paragraphs().unwrap(), 8);
    assert_eq!(storage.list_url_tags().unwrap(), first_pairs);

    let latest = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(latest.config_hash, "second");
    assert_eq!(storage.get_run(latest.id - 1).unwrap().config_hash, "first");
}

#[tokio::test]
async fn test_unreachable_seeds_store_nothing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("harvest.db");
    let config = create_test_config(&base_url, db_path.to_str().unwrap(), 3);

    let report = crawl(config, "test-hash").await.unwrap();

    assert_eq!(report.stats.pages_crawled, 0);
    assert_eq!(report.stats.pages_failed, 2);
    assert_eq!(report.pages_dispatched(), 2);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_paragraphs().unwrap(), 0);
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.pages_crawled, 0);
}

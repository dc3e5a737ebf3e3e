//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run whole crawl
//! sessions through the real HTTP transport and HTML parser.

use std::time::Duration;
use sumi_seek::config::{Config, FinderConfig};
use sumi_seek::{Coordinator, CrawlState, PageSnapshot, PageState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timings
fn create_test_config(max_pages: usize, max_workers: usize) -> Config {
    Config {
        finder: FinderConfig {
            max_pages,
            max_workers,
            politeness_delay: 5, // Very short for testing
            idle_check_interval: 20,
        },
        ..Config::default()
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn wait_for_stop(coordinator: &Coordinator) {
    let mut state = coordinator.watch_state();
    tokio::time::timeout(
        Duration::from_secs(10),
        state.wait_for(|state| *state == CrawlState::Stopped),
    )
    .await
    .expect("crawl did not stop")
    .expect("coordinator went away");
}

fn find<'a>(pages: &'a [PageSnapshot], uri: &str) -> &'a PageSnapshot {
    pages
        .iter()
        .find(|page| page.uri == uri)
        .unwrap_or_else(|| panic!("{} was never discovered", uri))
}

#[tokio::test]
async fn test_three_page_crawl_end_to_end() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(&server, "/", r#"<a href="b">B</a><a href="/c">C</a>"#).await;
    mount_page(&server, "/b", "nothing to see").await;
    mount_page(&server, "/c", "nothing here either").await;

    let coordinator = Coordinator::from_config(&create_test_config(3, 1)).unwrap();
    coordinator
        .start(&format!("{}/", base_url), "needle")
        .await
        .unwrap();
    wait_for_stop(&coordinator).await;

    assert_eq!(coordinator.state(), CrawlState::Stopped);
    assert_eq!(coordinator.processed_pages(), 3);
    assert_eq!(coordinator.progress(), 100.0);

    let pages = coordinator.pages();
    assert_eq!(pages.len(), 3);
    assert!(pages.iter().all(|page| page.state == PageState::NotFound));
    find(&pages, &format!("{}/b", base_url));
    find(&pages, &format!("{}/c", base_url));
}

#[tokio::test]
async fn test_matches_and_failures_recorded() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        r#"The needle is right here.
        <a href="/missing">Missing</a>
        <a href="/broken">Broken</a>
        <a href="/plain">Plain</a>"#,
    )
    .await;
    mount_page(&server, "/plain", "hay, only hay").await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let coordinator = Coordinator::from_config(&create_test_config(10, 2)).unwrap();
    coordinator.start(&base_url, "needle").await.unwrap();
    wait_for_stop(&coordinator).await;

    let pages = coordinator.pages();
    assert_eq!(pages.len(), 4);
    assert_eq!(coordinator.processed_pages(), 4);

    assert_eq!(find(&pages, &format!("{}/", base_url)).state, PageState::Found);
    assert_eq!(
        find(&pages, &format!("{}/plain", base_url)).state,
        PageState::NotFound
    );

    let missing = find(&pages, &format!("{}/missing", base_url));
    assert_eq!(missing.state, PageState::Error);
    assert_eq!(missing.error.as_deref(), Some("Http Error: 404 Not Found"));

    let broken = find(&pages, &format!("{}/broken", base_url));
    assert_eq!(broken.state, PageState::Error);
    assert_eq!(
        broken.error.as_deref(),
        Some("Http Error: 500 Internal Server Error")
    );
}

#[tokio::test]
async fn test_page_budget_caps_discovery() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    let anchors: String = (0..10)
        .map(|i| format!(r#"<a href="/page{}">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &anchors).await;
    for i in 0..10 {
        mount_page(&server, &format!("/page{}", i), "leaf").await;
    }

    let coordinator = Coordinator::from_config(&create_test_config(4, 2)).unwrap();
    coordinator.start(&base_url, "needle").await.unwrap();
    wait_for_stop(&coordinator).await;

    let uris: Vec<String> = coordinator.pages().into_iter().map(|p| p.uri).collect();
    assert_eq!(
        uris,
        vec![
            format!("{}/", base_url),
            format!("{}/page0", base_url),
            format!("{}/page1", base_url),
            format!("{}/page2", base_url),
        ]
    );
    assert_eq!(coordinator.processed_pages(), 4);
}

#[tokio::test]
async fn test_equivalent_links_fetched_once() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/about">1</a><a href="/about/">2</a><a href="/ABOUT">3</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html(r#"<a href="/">home</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = Coordinator::from_config(&create_test_config(10, 2)).unwrap();
    coordinator.start(&base_url, "needle").await.unwrap();
    wait_for_stop(&coordinator).await;

    assert_eq!(coordinator.pages().len(), 2);
    assert_eq!(coordinator.processed_pages(), 2);
    // Expectations are verified when the server drops
}

#[tokio::test]
async fn test_stop_interrupts_slow_fetch() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("slow").set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let coordinator = Coordinator::from_config(&create_test_config(5, 2)).unwrap();
    coordinator.start(&base_url, "needle").await.unwrap();
    assert_eq!(coordinator.state(), CrawlState::Work);

    tokio::time::sleep(Duration::from_millis(100)).await;
    tokio::time::timeout(Duration::from_secs(2), coordinator.stop())
        .await
        .expect("stop waited for the slow response")
        .unwrap();

    assert_eq!(coordinator.state(), CrawlState::Stopped);
    let pages = coordinator.pages();
    assert_eq!(pages[0].state, PageState::Error);
    assert_eq!(pages[0].error.as_deref(), Some("Request cancelled"));
    assert_eq!(coordinator.processed_pages(), 0);
}

#[tokio::test]
async fn test_rejected_start_leaves_session_stopped() {
    let coordinator = Coordinator::from_config(&create_test_config(5, 2)).unwrap();

    assert!(coordinator.start("ftp://example.com/", "needle").await.is_err());
    assert_eq!(coordinator.state(), CrawlState::Stopped);
    assert!(coordinator.pages().is_empty());
}

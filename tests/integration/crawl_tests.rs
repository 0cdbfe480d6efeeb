//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use hostcrawl::config::{parse_config, Config};
use hostcrawl::output::CrawlOutcome;
use hostcrawl::{Coordinator, CrawlSummary, MemorySink};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Upper bound for any single crawl in these tests
const CRAWL_TIMEOUT: Duration = Duration::from_secs(20);

/// Creates a test configuration that drains and exits without rate limiting
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.max_requests_per_second = 0;
    config.crawler.exit_when_idle = true;
    config.crawler.workers = Some(4);
    config.http.timeout_secs = 5;
    config
}

/// Mounts an HTML page that must be fetched exactly `times` times
async fn mount_page(server: &MockServer, page: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Runs a crawl to completion and returns its summary and emitted URLs
async fn crawl(config: Config, seed: &str) -> (CrawlSummary, Vec<String>) {
    let sink = Arc::new(MemorySink::new());
    let coordinator =
        Coordinator::new(config, seed, sink.clone()).expect("Failed to create coordinator");

    let summary = tokio::time::timeout(CRAWL_TIMEOUT, coordinator.run())
        .await
        .expect("Crawl did not drain in time");

    (summary, sink.urls())
}

fn assert_unique(urls: &[String]) {
    let unique: HashSet<&String> = urls.iter().collect();
    assert_eq!(unique.len(), urls.len(), "URL emitted twice: {:?}", urls);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_crawl_single_host() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/page1">Page 1</a><a href="/page2">Page 2</a>"#,
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        r#"<a href="/">Home</a><a href="/page2">Page 2</a><a href="page3">Page 3</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/page2", r#"<a href="/page1">Back</a>"#, 1).await;
    mount_page(&mock_server, "/page3", "<html><body>Leaf</body></html>", 1).await;

    let (summary, urls) = crawl(create_test_config(), &format!("{}/", base_url)).await;

    assert_unique(&urls);
    assert_eq!(urls[0], format!("{}/", base_url));

    let emitted: HashSet<String> = urls.into_iter().collect();
    let expected: HashSet<String> = ["/", "/page1", "/page2", "/page3"]
        .iter()
        .map(|page| format!("{}{}", base_url, page))
        .collect();
    assert_eq!(emitted, expected);

    assert_eq!(summary.outcome, CrawlOutcome::Drained);
    assert_eq!(summary.pages_fetched, 4);
    assert_eq!(summary.urls_visited, 4);
    assert_eq!(summary.urls_emitted, 4);
    assert_eq!(summary.fetch_failures, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_page_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/missing">Missing</a><a href="/ok">Ok</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/ok", r#"<a href="/deep">Deep</a>"#, 1).await;
    mount_page(&mock_server, "/deep", "<html></html>", 1).await;

    let (summary, urls) = crawl(create_test_config(), &format!("{}/", base_url)).await;

    assert_unique(&urls);
    assert_eq!(urls.len(), 4);
    assert!(urls.contains(&format!("{}/missing", base_url)));
    assert!(urls.contains(&format!("{}/deep", base_url)));

    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.fetch_failures, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_other_hosts_are_never_fetched() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Same IP, different port: a different host for crawl purposes
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&other_server)
        .await;

    let seed_body = format!(
        r#"<a href="{}/elsewhere">Elsewhere</a><a href="https://example.org/">Example</a><a href="/local">Local</a>"#,
        other_server.uri()
    );
    mount_page(&mock_server, "/", &seed_body, 1).await;
    mount_page(&mock_server, "/local", "<html></html>", 1).await;

    let (_, urls) = crawl(create_test_config(), &format!("{}/", base_url)).await;

    assert_eq!(
        urls.into_iter().collect::<HashSet<_>>(),
        HashSet::from([format!("{}/", base_url), format!("{}/local", base_url)])
    );
}

#[tokio::test]
async fn test_empty_seed_page_emits_only_seed() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/start", "<html><body>Nothing here</body></html>", 1).await;

    let seed = format!("{}/start", mock_server.uri());
    let (summary, urls) = crawl(create_test_config(), &seed).await;

    assert_eq!(urls, vec![seed]);
    assert_eq!(summary.outcome, CrawlOutcome::Drained);
    assert_eq!(summary.pages_fetched, 1);
}

#[tokio::test]
async fn test_idle_crawl_keeps_running_until_shutdown() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<a href="/only">Only</a>"#, 1).await;
    mount_page(&mock_server, "/only", "<html></html>", 1).await;

    let mut config = create_test_config();
    config.crawler.exit_when_idle = false;

    let sink = Arc::new(MemorySink::new());
    let seed = format!("{}/", mock_server.uri());
    let coordinator = Coordinator::new(config, &seed, sink.clone()).unwrap();

    let summary = tokio::time::timeout(
        CRAWL_TIMEOUT,
        coordinator.run_until(tokio::time::sleep(Duration::from_millis(1500))),
    )
    .await
    .expect("Shutdown signal was ignored");

    assert_eq!(summary.outcome, CrawlOutcome::Shutdown);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(sink.len(), 2);
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", r#"<a href="/next">Next</a>"#, 1).await;
    mount_page(&mock_server, "/next", "<html></html>", 1).await;

    let mut config = create_test_config();
    config.crawler.max_retries = 2;
    config.crawler.retry_backoff_ms = 10;

    let (summary, urls) = crawl(config, &format!("{}/", mock_server.uri())).await;

    assert_eq!(urls.len(), 2);
    assert_eq!(summary.retries, 1);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.fetch_failures, 0);
}

#[tokio::test]
async fn test_without_retries_transient_failure_is_abandoned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (summary, urls) = crawl(create_test_config(), &format!("{}/", mock_server.uri())).await;

    assert_eq!(urls.len(), 1);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(summary.retries, 0);
}

#[tokio::test]
async fn test_unfetchable_and_equivalent_links_filtered() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let seed_body = r##"
        <a href="/a%20b">Encoded</a>
        <a href="/a b">Raw</a>
        <a href="/a%20b#section">Fragment</a>
        <a href="#top">Top</a>
        <a href="mailto:someone@example.com">Mail</a>
        <a href="javascript:void(0)">Script</a>
        <a href="tel:+15555550100">Call</a>
    "##;
    mount_page(&mock_server, "/", seed_body, 1).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&mock_server)
        .await;

    let (summary, urls) = crawl(create_test_config(), &format!("{}/", base_url)).await;

    assert_eq!(
        urls,
        vec![format!("{}/", base_url), format!("{}/a b", base_url)]
    );
    assert_eq!(summary.pages_fetched, 2);
}

#[tokio::test]
async fn test_reserved_escape_in_path_is_fetched_as_written() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/a%3Fb">Question</a>"#, 1).await;
    mount_page(&mock_server, "/a%3Fb", r#"<a href="/child">Child</a>"#, 1).await;
    mount_page(&mock_server, "/child", "<html></html>", 1).await;

    let (summary, urls) = crawl(create_test_config(), &format!("{}/", base_url)).await;

    assert_eq!(
        urls,
        vec![
            format!("{}/", base_url),
            format!("{}/a?b", base_url),
            format!("{}/child", base_url),
        ]
    );
    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.fetch_failures, 0);
}

/// Mounts `/r0 -> /r1 -> ... -> /r{hops}` as a chain of redirects
async fn mount_redirect_chain(server: &MockServer, hops: usize) {
    for i in 0..hops {
        Mock::given(method("GET"))
            .and(path(format!("/r{}", i)))
            .respond_with(ResponseTemplate::new(302).insert_header("location", format!("/r{}", i + 1)))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_redirect_hops_are_separate_crawled_urls() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_redirect_chain(&mock_server, 3).await;
    mount_page(&mock_server, "/r3", "<html></html>", 1).await;

    let (summary, urls) = crawl(create_test_config(), &format!("{}/r0", base_url)).await;

    assert_eq!(
        urls,
        (0..4)
            .map(|i| format!("{}/r{}", base_url, i))
            .collect::<Vec<_>>()
    );
    assert_eq!(summary.pages_fetched, 4);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_redirect_chain_respects_rate_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_redirect_chain(&mock_server, 5).await;
    mount_page(&mock_server, "/r5", "<html></html>", 0).await;

    let config = parse_config(
        r#"
[crawler]
max-requests-per-second = 1
rate-window-ms = 60000
workers = 2
"#,
    )
    .unwrap();

    let sink = Arc::new(MemorySink::new());
    let coordinator = Coordinator::new(config, &format!("{}/r0", base_url), sink.clone()).unwrap();

    let summary = tokio::time::timeout(
        CRAWL_TIMEOUT,
        coordinator.run_until(tokio::time::sleep(Duration::from_millis(500))),
    )
    .await
    .expect("Shutdown signal was ignored");

    // One slot per minute: only the first hop may reach the server
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(
        sink.urls(),
        vec![format!("{}/r0", base_url), format!("{}/r1", base_url)]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_small_frontier_does_not_deadlock() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let seed_body: String = (0..30)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();
    mount_page(&mock_server, "/", &seed_body, 1).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="/">Home</a>"#))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.crawler.queue_capacity = 1;
    config.crawler.workers = Some(2);

    let (summary, urls) = crawl(config, &format!("{}/", base_url)).await;

    assert_unique(&urls);
    assert_eq!(urls.len(), 31);
    assert_eq!(summary.pages_fetched, 31);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rate_limit_spreads_requests() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let seed_body: String = (0..5)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();
    mount_page(&mock_server, "/", &seed_body, 1).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&mock_server)
        .await;

    let config = parse_config(
        r#"
[crawler]
max-requests-per-second = 5
exit-when-idle = true
workers = 6
"#,
    )
    .unwrap();

    let started = Instant::now();
    let (summary, urls) = crawl(config, &format!("{}/", base_url)).await;

    // Six fetches at five per second need a second window
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(urls.len(), 6);
    assert_eq!(summary.pages_fetched, 6);
    assert!(summary.rate_deferrals > 0);
}

#[test]
fn test_invalid_seed_rejected() {
    let sink = Arc::new(MemorySink::new());
    assert!(Coordinator::new(create_test_config(), "not-a-url", sink.clone()).is_err());
    assert!(Coordinator::new(create_test_config(), "mailto:a@b.com", sink).is_err());
}

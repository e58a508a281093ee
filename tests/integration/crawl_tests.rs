//! Integration tests for the harvester
//!
//! These tests use wiremock to serve listing pages and run the full
//! fetch, extract, filter, persist cycle end-to-end into a temp directory.

use blurb_harvest::config::{Config, RequestedCount};
use blurb_harvest::crawler::{Coordinator, Fetcher, Harvest, RetryPolicy, StopPolicy};
use blurb_harvest::state::{CrawlPhase, CrawlState};
use blurb_harvest::storage::{CsvSink, WorkSink};
use blurb_harvest::HarvestError;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TAG_PARAM: &str = "work_search[other_tag_names]";

/// Renders one work blurb as it appears on a listing page
fn blurb(id: u32, words: u32) -> String {
    format!(
        r#"<li id="work_{id}" class="work blurb group" role="article">
            <div class="header module">
                <h4 class="heading"><a href="/works/{id}">Work {id}</a> by <a rel="author" href="/users/a">a</a></h4>
            </div>
            <dl class="stats">
                <dt class="words">Words:</dt><dd class="words">{words}</dd>
                <dt class="chapters">Chapters:</dt><dd class="chapters">2/?</dd>
                <dt class="kudos">Kudos:</dt><dd class="kudos"><a href="/works/{id}/kudos">1,200</a></dd>
            </dl>
        </li>"#
    )
}

/// Renders a listing page holding `works` as (id, words) pairs
fn listing(works: &[(u32, u32)]) -> String {
    let blurbs: String = works.iter().map(|(id, words)| blurb(*id, *words)).collect();
    format!(
        r#"<html><body><h2 class="heading">Works</h2><ol class="work index group">{}</ol></body></html>"#,
        blurbs
    )
}

fn page_response(works: &[(u32, u32)]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(listing(works))
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page: &str, works: &[(u32, u32)]) {
    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("page", page))
        .respond_with(page_response(works))
        .mount(server)
        .await;
}

/// Creates a test configuration against the mock server with near-zero delays
fn create_test_config(server: &MockServer, dir: &Path, requested: RequestedCount) -> Config {
    let mut config = Config::for_url(format!(
        "{}/works?commit=Sort+and+Filter&work_search%5Bsort_column%5D=word_count",
        server.uri()
    ));
    config.search.requested = requested;
    config.fetch.user_agent = "TestHarvester/1.0".to_string();
    config.fetch.politeness_delay = 0;
    config.fetch.rate_limit_backoff = 10;
    config.output.directory = dir.to_path_buf();
    config.output.name = "works".to_string();
    config
}

fn written_ids(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("works.csv"))
        .unwrap_or_default()
        .lines()
        .map(|line| line.split(',').next().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_stops_once_requested_count_is_reached() {
    let server = MockServer::start().await;
    mount_page(&server, "1", &[(1, 90_000), (2, 80_000)]).await;
    mount_page(&server, "2", &[(3, 70_000), (4, 60_000)]).await;
    Mock::given(method("GET"))
        .and(query_param("page", "3"))
        .respond_with(page_response(&[(5, 50_000)]))
        .expect(0) // Satisfied after page 2
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path(), RequestedCount::Count(3));

    let summary = Harvest::new(config).run().await.expect("Harvest failed");

    assert_eq!(summary.runs.len(), 1);
    assert_eq!(summary.runs[0].phase, CrawlPhase::Satisfied);
    assert_eq!(summary.runs[0].recorded, 4);
    assert_eq!(summary.runs[0].pages, 2);
    assert!(summary.runs[0].next_url.ends_with("&page=3"));
    assert_eq!(written_ids(dir.path()), vec!["1", "2", "3", "4"]);

    let content = std::fs::read_to_string(dir.path().join("works.csv")).unwrap();
    assert_eq!(content.lines().next(), Some("1,2,90000,1200,Work 1"));

    let readme = std::fs::read_to_string(dir.path().join("works_readme.txt")).unwrap();
    assert!(readme.contains("&page=3\n"));
    assert!(readme.contains("num_requested_fic: 3\n"));
}

#[tokio::test]
async fn test_empty_page_exhausts_run() {
    let server = MockServer::start().await;
    mount_page(&server, "1", &[(1, 90_000), (2, 80_000)]).await;
    mount_page(&server, "2", &[]).await;

    let dir = TempDir::new().unwrap();
    for requested in [RequestedCount::All, RequestedCount::Count(100)] {
        let mut config = create_test_config(&server, dir.path(), requested);
        config.output.name = format!("works_{}", requested);

        let summary = Harvest::new(config).run().await.expect("Harvest failed");
        assert_eq!(summary.runs[0].phase, CrawlPhase::Exhausted);
        assert_eq!(summary.runs[0].recorded, 2);
        assert_eq!(summary.runs[0].pages, 2);
    }
}

#[tokio::test]
async fn test_word_floor_ends_harvest() {
    let server = MockServer::start().await;
    mount_page(&server, "1", &[(1, 9000), (2, 5000), (3, 4000), (4, 3000)]).await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(page_response(&[(5, 2000)]))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path(), RequestedCount::All);

    let summary = Harvest::new(config).run().await.expect("Harvest failed");

    assert_eq!(summary.runs[0].phase, CrawlPhase::BelowWordFloor);
    assert_eq!(written_ids(dir.path()), vec!["1", "2"]);
    // The URL still advances past the stopping page
    assert!(summary.runs[0].next_url.ends_with("&page=2"));
}

#[tokio::test]
async fn test_work_exactly_at_word_floor_ends_harvest() {
    let server = MockServer::start().await;
    mount_page(&server, "1", &[(1, 9000), (2, 5000)]).await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(page_response(&[(3, 4500)]))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path(), RequestedCount::All);

    let summary = Harvest::new(config).run().await.expect("Harvest failed");

    assert_eq!(summary.runs[0].phase, CrawlPhase::BelowWordFloor);
    assert_eq!(summary.runs[0].pages, 1);
    assert_eq!(written_ids(dir.path()), vec!["1", "2"]);
}

#[tokio::test]
async fn test_duplicates_across_pages_are_written_once() {
    let server = MockServer::start().await;
    mount_page(&server, "1", &[(1, 90_000), (2, 80_000)]).await;
    mount_page(&server, "2", &[(2, 80_000), (3, 70_000)]).await;
    mount_page(&server, "3", &[]).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path(), RequestedCount::All);

    let summary = Harvest::new(config).run().await.expect("Harvest failed");

    assert_eq!(summary.total_recorded(), 3);
    assert_eq!(written_ids(dir.path()), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_start_page_is_respected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(page_response(&[(1, 90_000)]))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "4", &[(40, 90_000)]).await;
    mount_page(&server, "5", &[]).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, dir.path(), RequestedCount::All);
    config.search.start_page = 4;

    Harvest::new(config).run().await.expect("Harvest failed");
    assert_eq!(written_ids(dir.path()), vec!["40"]);
}

#[tokio::test]
async fn test_rate_limited_request_is_retried() {
    let server = MockServer::start().await;

    // First two attempts are refused; mocks are matched in mount order
    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "1", &[(1, 90_000)]).await;
    mount_page(&server, "2", &[]).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path(), RequestedCount::All);

    let summary = Harvest::new(config).run().await.expect("Harvest failed");

    assert_eq!(summary.runs[0].phase, CrawlPhase::Exhausted);
    assert_eq!(written_ids(dir.path()), vec!["1"]);
}

#[tokio::test]
async fn test_retry_cap_surfaces_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, dir.path(), RequestedCount::All);
    config.fetch.max_rate_limit_retries = Some(2);

    let result = Harvest::new(config).run().await;
    assert!(matches!(
        result,
        Err(HarvestError::RateLimited { attempts: 3, .. })
    ));
}

#[tokio::test]
async fn test_server_error_fails_run_and_keeps_written_pages() {
    let server = MockServer::start().await;
    mount_page(&server, "1", &[(1, 90_000), (2, 80_000)]).await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path(), RequestedCount::All);

    let result = Harvest::new(config).run().await;

    assert!(matches!(
        result,
        Err(HarvestError::HttpStatus { status: 503, .. })
    ));
    assert_eq!(written_ids(dir.path()), vec!["1", "2"]);
}

#[tokio::test]
async fn test_resume_skips_existing_ids() {
    let server = MockServer::start().await;
    mount_page(&server, "1", &[(1, 90_000), (2, 80_000), (3, 70_000)]).await;
    mount_page(&server, "2", &[]).await;

    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("works.csv"), "2,1,80000,5,Old Work 2\n").unwrap();

    let mut config = create_test_config(&server, dir.path(), RequestedCount::All);
    config.output.resume = true;

    let summary = Harvest::new(config).run().await.expect("Harvest failed");

    assert_eq!(summary.total_recorded(), 2);
    assert_eq!(written_ids(dir.path()), vec!["2", "1", "3"]);
}

#[tokio::test]
async fn test_without_resume_existing_rows_are_appended_to() {
    let server = MockServer::start().await;
    mount_page(&server, "1", &[(2, 80_000)]).await;
    mount_page(&server, "2", &[]).await;

    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("works.csv"), "2,1,80000,5,Old Work 2\n").unwrap();

    let config = create_test_config(&server, dir.path(), RequestedCount::All);
    Harvest::new(config).run().await.expect("Harvest failed");

    assert_eq!(written_ids(dir.path()), vec!["2", "2"]);
}

#[tokio::test]
async fn test_tag_runs_share_seen_ids() {
    let server = MockServer::start().await;

    for (tag, works) in [
        ("Fluff", vec![(1, 90_000), (2, 80_000)]),
        ("Angst", vec![(2, 80_000), (3, 70_000)]),
    ] {
        Mock::given(method("GET"))
            .and(query_param(TAG_PARAM, tag))
            .and(query_param("page", "1"))
            .respond_with(page_response(&works))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param(TAG_PARAM, tag))
            .and(query_param("page", "2"))
            .respond_with(page_response(&[]))
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, dir.path(), RequestedCount::All);
    config.search.tags = vec!["Fluff".to_string(), "Angst".to_string()];

    let summary = Harvest::new(config).run().await.expect("Harvest failed");

    assert_eq!(summary.runs.len(), 2);
    assert_eq!(summary.runs[0].recorded, 2);
    assert_eq!(summary.runs[1].recorded, 1);
    assert!(summary
        .runs
        .iter()
        .all(|run| run.phase == CrawlPhase::Exhausted));
    assert_eq!(written_ids(dir.path()), vec!["1", "2", "3"]);

    let readme = std::fs::read_to_string(dir.path().join("works_readme.txt")).unwrap();
    assert!(readme.contains("tags: Fluff, Angst\n"));
}

#[tokio::test]
async fn test_coordinator_reset_keeps_seen_ids() {
    let server = MockServer::start().await;
    mount_page(&server, "1", &[(1, 90_000), (2, 80_000)]).await;
    mount_page(&server, "2", &[]).await;

    let dir = TempDir::new().unwrap();
    let sink = CsvSink::new(dir.path(), "works");
    let url = format!("{}/works?page=1", server.uri());

    let mut coordinator = Coordinator::from_parts(
        Fetcher::with_client(
            reqwest::Client::new(),
            RetryPolicy {
                backoff: Duration::from_millis(1),
                max_retries: None,
            },
        ),
        StopPolicy::default(),
        sink,
        CrawlState::new(url.clone()),
        RequestedCount::All,
        Duration::ZERO,
    );

    assert_eq!(coordinator.run().await.unwrap(), CrawlPhase::Exhausted);
    assert_eq!(coordinator.state().recorded(), 2);

    coordinator.reset(url);
    assert_eq!(coordinator.phase(), CrawlPhase::UnboundedRunning);
    assert_eq!(coordinator.run().await.unwrap(), CrawlPhase::Exhausted);
    assert_eq!(coordinator.state().recorded(), 0);

    assert_eq!(coordinator.sink().preload().unwrap().len(), 2);
    assert_eq!(written_ids(dir.path()), vec!["1", "2"]);
}

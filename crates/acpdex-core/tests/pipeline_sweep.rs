//! Full-sweep pipeline behavior over a scripted upstream: pagination
//! discovery, bounded batch fan-out, page-level error aggregation, and the
//! circuit breaker contract at the sweep boundary.

use std::sync::Arc;

use acpdex_core::breaker::{CircuitBreaker, CircuitState};
use acpdex_core::config::{BreakerConfig, RegistryConfig};
use acpdex_core::fakes::{raw_agent, ScriptedPageFetcher};
use acpdex_core::pipeline::{BulkFetcher, FetchDisposition};

fn test_config() -> RegistryConfig {
    RegistryConfig::default().with_api_base("http://scripted.invalid/api/agents")
}

fn sweep_fixture(fetcher: Arc<ScriptedPageFetcher>) -> (BulkFetcher, Arc<CircuitBreaker>) {
    let breaker = Arc::new(CircuitBreaker::new(BreakerConfig {
        failure_threshold: 5,
        cooldown: std::time::Duration::from_secs(60),
    }));
    let pipeline = BulkFetcher::new(fetcher, Arc::clone(&breaker), &test_config());
    (pipeline, breaker)
}

/// Script a three-page listing: 2 agents on page 1, one each on pages 2
/// and 3.
fn three_page_listing() -> Arc<ScriptedPageFetcher> {
    let fetcher = Arc::new(ScriptedPageFetcher::new());
    fetcher.script_page(1, vec![raw_agent("Alpha"), raw_agent("Beta")], 4, 3);
    fetcher.script_page(2, vec![raw_agent("Gamma")], 4, 3);
    fetcher.script_page(3, vec![raw_agent("Delta")], 4, 3);
    fetcher
}

#[tokio::test]
async fn sweep_collects_every_page_in_order() {
    let fetcher = three_page_listing();
    let (pipeline, breaker) = sweep_fixture(Arc::clone(&fetcher));

    let outcome = pipeline.fetch_all().await;

    assert_eq!(outcome.disposition, FetchDisposition::Completed);
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.total_from_api, 4);
    let names: Vec<_> = outcome.agents.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Alpha", "Beta", "Gamma", "Delta"]);
    assert_eq!(fetcher.call_count(), 3, "each page fetched exactly once");
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[tokio::test]
async fn single_page_listing_needs_no_batches() {
    let fetcher = Arc::new(ScriptedPageFetcher::new());
    fetcher.script_page(1, vec![raw_agent("Solo")], 1, 1);
    let (pipeline, _breaker) = sweep_fixture(Arc::clone(&fetcher));

    let outcome = pipeline.fetch_all().await;

    assert_eq!(outcome.agents.len(), 1);
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test]
async fn failed_page_is_recorded_without_aborting_siblings() {
    let fetcher = three_page_listing();
    fetcher.script_failure(2, "request timed out");
    let (pipeline, breaker) = sweep_fixture(Arc::clone(&fetcher));

    let outcome = pipeline.fetch_all().await;

    assert_eq!(outcome.disposition, FetchDisposition::Completed);
    let names: Vec<_> = outcome.agents.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Alpha", "Beta", "Delta"]);
    assert_eq!(outcome.errors, vec!["Page 2: HTTP error: request timed out"]);
    // Partial success still counts as a completed sweep for the breaker.
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.failure_count(), 0);
}

#[tokio::test]
async fn malformed_records_are_dropped_silently() {
    let fetcher = Arc::new(ScriptedPageFetcher::new());
    fetcher.script_page(
        1,
        vec![
            raw_agent("Kept"),
            serde_json::json!({"name": "Unknown"}),
            serde_json::json!({"walletAddress": "0xnameless"}),
        ],
        3,
        1,
    );
    let (pipeline, _breaker) = sweep_fixture(fetcher);

    let outcome = pipeline.fetch_all().await;

    assert_eq!(outcome.agents.len(), 1);
    assert_eq!(outcome.agents[0].name, "Kept");
    assert!(outcome.errors.is_empty(), "dropped records are not errors");
}

#[tokio::test]
async fn pagination_discovery_failure_faults_the_sweep() {
    let fetcher = Arc::new(ScriptedPageFetcher::new());
    fetcher.script_failure(1, "connection refused");
    let (pipeline, breaker) = sweep_fixture(Arc::clone(&fetcher));

    let outcome = pipeline.fetch_all().await;

    assert_eq!(outcome.disposition, FetchDisposition::Faulted);
    assert!(outcome.agents.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with("Page 1:"));
    assert_eq!(breaker.failure_count(), 1);
    assert_eq!(fetcher.call_count(), 1, "no batches after a faulted discovery");
}

#[tokio::test]
async fn open_breaker_short_circuits_without_network_calls() {
    let fetcher = three_page_listing();
    let (pipeline, breaker) = sweep_fixture(Arc::clone(&fetcher));
    for _ in 0..5 {
        breaker.record_failure();
    }

    let outcome = pipeline.fetch_all().await;

    assert_eq!(outcome.disposition, FetchDisposition::BreakerOpen);
    assert!(outcome.agents.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("circuit breaker open"));
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn repeated_faults_open_the_breaker() {
    let fetcher = Arc::new(ScriptedPageFetcher::new());
    fetcher.script_failure(1, "bad gateway");
    let (pipeline, breaker) = sweep_fixture(Arc::clone(&fetcher));

    for _ in 0..5 {
        let outcome = pipeline.fetch_all().await;
        assert_eq!(outcome.disposition, FetchDisposition::Faulted);
    }
    assert_eq!(breaker.state(), CircuitState::Open);

    // The sixth sweep is refused before reaching the network.
    let calls_before = fetcher.call_count();
    let outcome = pipeline.fetch_all().await;
    assert_eq!(outcome.disposition, FetchDisposition::BreakerOpen);
    assert_eq!(fetcher.call_count(), calls_before);
}

#[tokio::test]
async fn successive_sweeps_of_unchanged_upstream_are_identical() {
    let fetcher = three_page_listing();
    let (pipeline, _breaker) = sweep_fixture(fetcher);

    let first = pipeline.fetch_all().await;
    let second = pipeline.fetch_all().await;

    assert_eq!(first.agents, second.agents);
}

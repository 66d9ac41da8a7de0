//! Tests for engine module

use super::*;
use crate::error::{Error, Result};
use crate::pagination::{PageLinks, PageResponse, PaginationState};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

const HOST: &str = "https://api.sparkpost.com";
const START: &str = "https://api.sparkpost.com/api/v1/events/message?cursor=initial";

/// Replays canned responses in order and records every requested URL
struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<PageResponse>>>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn new(responses: Vec<Result<PageResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, url: &str) -> Result<PageResponse> {
        self.requested.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("no more canned responses".to_string())))
    }
}

fn page(records: usize, total: u64, next: Option<&str>) -> Result<PageResponse> {
    Ok(PageResponse {
        results: (0..records).map(|i| json!({ "event_id": i })).collect(),
        total_count: total,
        links: PageLinks {
            next: next.map(String::from),
        },
    })
}

fn cursor_link(cursor: &str) -> String {
    format!("/api/v1/events/message?cursor={cursor}")
}

fn fast_config() -> WalkConfig {
    WalkConfig::new()
        .with_page_delay(Duration::from_millis(1))
        .with_retry_delay(Duration::from_millis(1))
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_walk_config_default() {
    let config = WalkConfig::default();
    assert_eq!(config.page_delay, Duration::from_millis(5000));
    assert_eq!(config.retry_delay, Duration::from_millis(10_000));
    assert_eq!(config.retry_policy, RetryPolicy::unlimited());
}

#[test]
fn test_retry_policy_allows() {
    let unlimited = RetryPolicy::unlimited();
    assert!(unlimited.allows(0));
    assert!(unlimited.allows(u32::MAX));

    let limited = RetryPolicy::limited(2);
    assert!(limited.allows(0));
    assert!(limited.allows(1));
    assert!(!limited.allows(2));

    assert!(!RetryPolicy::limited(0).allows(0));
}

#[test]
fn test_walk_state_terminal() {
    assert!(WalkState::Finished(WalkOutcome::Exhausted).is_terminal());
    assert!(!WalkState::Fetching {
        url: START.to_string()
    }
    .is_terminal());
    assert!(!WalkState::WaitingToRetry {
        url: START.to_string()
    }
    .is_terminal());
    assert!(!WalkState::WaitingToAdvance {
        next_url: START.to_string()
    }
    .is_terminal());
}

// ============================================================================
// Walk Tests
// ============================================================================

#[tokio::test]
async fn test_walk_single_page() {
    let fetcher = ScriptedFetcher::new(vec![page(42, 42, None)]);
    let walker = PageWalker::new(fetcher, HOST).with_config(fast_config());

    let report = walker.walk(START).await;

    assert_eq!(report.outcome, WalkOutcome::Exhausted);
    assert_eq!(report.seen_events(), 42);
    assert_eq!(report.state.pages_fetched, 1);
    assert_eq!(walker.fetcher().requested(), vec![START.to_string()]);
}

#[tokio::test]
async fn test_walk_follows_links_until_exhausted() {
    let fetcher = ScriptedFetcher::new(vec![
        page(100, 250, Some(&cursor_link("p2"))),
        page(100, 250, Some(&cursor_link("p3"))),
        page(50, 250, None),
        // never requested
        page(999, 999, None),
    ]);
    let walker = PageWalker::new(fetcher, HOST).with_config(fast_config());

    let report = walker.walk(START).await;

    assert!(report.outcome.is_exhausted());
    assert_eq!(report.seen_events(), 250);
    assert_eq!(report.state.total_count, Some(250));
    assert_eq!(
        walker.fetcher().requested(),
        vec![
            START.to_string(),
            format!("{HOST}{}", cursor_link("p2")),
            format!("{HOST}{}", cursor_link("p3")),
        ]
    );
}

#[tokio::test]
async fn test_walk_counter_is_prefix_sum() {
    let sizes = [3usize, 7, 0, 11, 5];
    let mut responses = Vec::new();
    for (i, size) in sizes.iter().enumerate() {
        let next = (i + 1 < sizes.len()).then(|| cursor_link(&format!("c{i}")));
        responses.push(page(*size, 26, next.as_deref()));
    }

    let walker = PageWalker::new(ScriptedFetcher::new(responses), HOST);
    let mut pagination = PaginationState::new();
    let mut state = WalkState::Fetching {
        url: START.to_string(),
    };
    let mut fetched = 0;

    // Drive the loop by hand to observe the counter after every page
    while !state.is_terminal() {
        let was_fetching = matches!(state, WalkState::Fetching { .. });
        state = match state {
            // skip the waits
            WalkState::WaitingToAdvance { next_url } => WalkState::Fetching { url: next_url },
            other => walker.step(other, &mut pagination).await,
        };
        if was_fetching {
            fetched += 1;
            let expected: usize = sizes[..fetched].iter().sum();
            assert_eq!(pagination.seen_events, expected as u64);
        }
    }

    assert_eq!(fetched, sizes.len());
    assert_eq!(state, WalkState::Finished(WalkOutcome::Exhausted));
}

#[tokio::test]
async fn test_walk_resolves_relative_link_against_host() {
    let fetcher = ScriptedFetcher::new(vec![
        page(1, 2, Some("/api/v1/events/message?cursor=abc123")),
        page(1, 2, None),
    ]);
    let walker = PageWalker::new(fetcher, HOST).with_config(fast_config());

    walker.walk(START).await;

    assert_eq!(
        walker.fetcher().requested()[1],
        "https://api.sparkpost.com/api/v1/events/message?cursor=abc123"
    );
}

#[tokio::test]
async fn test_walk_empty_next_link_ends_walk() {
    let fetcher = ScriptedFetcher::new(vec![page(10, 10, Some(""))]);
    let walker = PageWalker::new(fetcher, HOST).with_config(fast_config());

    let report = walker.walk(START).await;

    assert!(report.outcome.is_exhausted());
    assert_eq!(walker.fetcher().requested().len(), 1);
}

// ============================================================================
// Retry Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_walk_retries_429_once_after_retry_delay() {
    let fetcher = ScriptedFetcher::new(vec![
        Err(Error::http_status(429, "Too Many Requests")),
        page(100, 100, None),
    ]);
    let walker = PageWalker::new(fetcher, HOST);

    let start = Instant::now();
    let report = walker.walk(START).await;

    assert!(start.elapsed() >= Duration::from_millis(10_000));
    assert!(report.outcome.is_exhausted());
    assert_eq!(report.seen_events(), 100);
    assert_eq!(report.state.retries, 1);
    assert_eq!(
        walker.fetcher().requested(),
        vec![START.to_string(), START.to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_walk_waits_page_delay_between_pages() {
    let fetcher = ScriptedFetcher::new(vec![
        page(1, 3, Some(&cursor_link("2"))),
        page(1, 3, Some(&cursor_link("3"))),
        page(1, 3, None),
    ]);
    let walker = PageWalker::new(fetcher, HOST);

    let start = Instant::now();
    let report = walker.walk(START).await;

    assert!(report.outcome.is_exhausted());
    assert!(start.elapsed() >= Duration::from_millis(2 * 5000));
    assert!(start.elapsed() < Duration::from_millis(3 * 5000));
}

#[tokio::test]
async fn test_walk_retries_5xx() {
    let fetcher = ScriptedFetcher::new(vec![
        page(10, 30, Some(&cursor_link("b"))),
        Err(Error::http_status(500, "")),
        Err(Error::http_status(502, "")),
        Err(Error::http_status(503, "")),
        page(20, 30, None),
    ]);
    let walker = PageWalker::new(fetcher, HOST).with_config(fast_config());

    let report = walker.walk(START).await;

    let next = format!("{HOST}{}", cursor_link("b"));
    assert!(report.outcome.is_exhausted());
    assert_eq!(report.state.retries, 3);
    assert_eq!(
        walker.fetcher().requested(),
        vec![
            START.to_string(),
            next.clone(),
            next.clone(),
            next.clone(),
            next
        ]
    );
}

#[tokio::test]
async fn test_walk_retries_do_not_double_count() {
    let fetcher = ScriptedFetcher::new(vec![
        page(100, 200, Some(&cursor_link("b"))),
        Err(Error::http_status(429, "")),
        Err(Error::http_status(503, "")),
        page(100, 200, None),
    ]);
    let walker = PageWalker::new(fetcher, HOST).with_config(fast_config());

    let report = walker.walk(START).await;

    assert_eq!(report.seen_events(), 200);
    assert_eq!(report.state.pages_fetched, 2);
}

#[tokio::test]
async fn test_walk_retry_cap_turns_fatal() {
    let fetcher = ScriptedFetcher::new(vec![
        Err(Error::http_status(503, "")),
        Err(Error::http_status(503, "")),
        Err(Error::http_status(503, "")),
        page(1, 1, None),
    ]);
    let walker = PageWalker::new(fetcher, HOST)
        .with_config(fast_config().with_retry_policy(RetryPolicy::limited(2)));

    let report = walker.walk(START).await;

    match report.outcome {
        WalkOutcome::Failed { url, error, status } => {
            assert_eq!(url, START);
            assert_eq!(status, Some(503));
            assert!(error.contains("Max retries (2) exceeded"));
        }
        other => panic!("Expected Failed, got {other:?}"),
    }
    assert_eq!(walker.fetcher().requested().len(), 3);
    assert_eq!(report.state.retries, 2);
}

#[tokio::test]
async fn test_walk_retry_cap_resets_per_page() {
    let fetcher = ScriptedFetcher::new(vec![
        Err(Error::http_status(429, "")),
        page(1, 2, Some(&cursor_link("b"))),
        Err(Error::http_status(429, "")),
        page(1, 2, None),
    ]);
    let walker = PageWalker::new(fetcher, HOST)
        .with_config(fast_config().with_retry_policy(RetryPolicy::limited(1)));

    let report = walker.walk(START).await;

    assert!(report.outcome.is_exhausted());
    assert_eq!(report.state.retries, 2);
    assert_eq!(report.seen_events(), 2);
}

// ============================================================================
// Fatal Tests
// ============================================================================

#[tokio::test]
async fn test_walk_404_is_fatal() {
    let fetcher = ScriptedFetcher::new(vec![
        Err(Error::http_status(404, "Not found")),
        page(1, 1, None),
    ]);
    let walker = PageWalker::new(fetcher, HOST).with_config(fast_config());

    let report = walker.walk(START).await;

    assert_eq!(
        report.outcome,
        WalkOutcome::Failed {
            url: START.to_string(),
            error: "HTTP 404: Not found".to_string(),
            status: Some(404),
        }
    );
    assert_eq!(walker.fetcher().requested().len(), 1);
    assert_eq!(report.seen_events(), 0);
}

#[tokio::test]
async fn test_walk_fatal_after_progress_keeps_totals() {
    let fetcher = ScriptedFetcher::new(vec![
        page(100, 300, Some(&cursor_link("b"))),
        Err(Error::http_status(401, "Unauthorized")),
    ]);
    let walker = PageWalker::new(fetcher, HOST).with_config(fast_config());

    let report = walker.walk(START).await;

    match &report.outcome {
        WalkOutcome::Failed { url, .. } => {
            assert_eq!(url, &format!("{HOST}{}", cursor_link("b")));
        }
        other => panic!("Expected Failed, got {other:?}"),
    }
    assert_eq!(report.seen_events(), 100);
}

#[tokio::test]
async fn test_walk_error_without_status_is_fatal() {
    let parse_err = serde_json::from_str::<PageResponse>("not json").unwrap_err();
    let fetcher = ScriptedFetcher::new(vec![Err(Error::from(parse_err))]);
    let walker = PageWalker::new(fetcher, HOST).with_config(fast_config());

    let report = walker.walk(START).await;

    match report.outcome {
        WalkOutcome::Failed { status, error, .. } => {
            assert_eq!(status, None);
            assert!(error.starts_with("Failed to parse JSON"));
        }
        other => panic!("Expected Failed, got {other:?}"),
    }
    assert_eq!(report.state.retries, 0);
}

#[tokio::test]
async fn test_step_finished_is_fixed_point() {
    let walker = PageWalker::new(ScriptedFetcher::new(vec![]), HOST);
    let mut pagination = PaginationState::new();

    let state = WalkState::Finished(WalkOutcome::Exhausted);
    let next = walker.step(state.clone(), &mut pagination).await;

    assert_eq!(next, state);
    assert!(walker.fetcher().requested().is_empty());
}

//! Execution engine module
//!
//! The walk loop that pages through the events API.
//!
//! # Overview
//!
//! - `PageWalker` - drives the loop over `WalkState` until a terminal state
//! - `WalkConfig` - delays and retry policy
//! - `WalkReport` - outcome plus the final `PaginationState`
//!
//! The loop is iterative: following a hundred thousand pages or retrying a
//! page forever does not grow the stack.

mod types;

pub use types::{RetryPolicy, WalkConfig, WalkOutcome, WalkReport, WalkState};

use crate::error::Error;
use crate::http::PageFetcher;
use crate::pagination::{NextLinkPaginator, NextPage, PaginationState};
use tracing::{debug, error, info, warn};

/// Pages through the events API one request at a time
pub struct PageWalker<F> {
    /// Page source
    fetcher: F,
    /// Next link resolution
    paginator: NextLinkPaginator,
    /// Walk configuration
    config: WalkConfig,
}

impl<F: PageFetcher> PageWalker<F> {
    /// Create a new walker resolving next links against `host`
    pub fn new(fetcher: F, host: impl Into<String>) -> Self {
        Self {
            fetcher,
            paginator: NextLinkPaginator::new(host),
            config: WalkConfig::default(),
        }
    }

    /// Set walk configuration
    #[must_use]
    pub fn with_config(mut self, config: WalkConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the page source
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Walk every page starting at `start_url`
    ///
    /// Never fails: fatal errors are logged and reported in the outcome.
    pub async fn walk(&self, start_url: &str) -> WalkReport {
        let mut pagination = PaginationState::new();
        let mut state = WalkState::Fetching {
            url: start_url.to_string(),
        };

        loop {
            state = match state {
                WalkState::Finished(outcome) => {
                    return WalkReport {
                        outcome,
                        state: pagination,
                    }
                }
                active => self.step(active, &mut pagination).await,
            };
        }
    }

    /// Perform one transition
    pub async fn step(&self, state: WalkState, pagination: &mut PaginationState) -> WalkState {
        match state {
            WalkState::Fetching { url } => self.fetch(url, pagination).await,
            WalkState::WaitingToAdvance { next_url } => {
                tokio::time::sleep(self.config.page_delay).await;
                WalkState::Fetching { url: next_url }
            }
            WalkState::WaitingToRetry { url } => {
                tokio::time::sleep(self.config.retry_delay).await;
                WalkState::Fetching { url }
            }
            finished @ WalkState::Finished(_) => finished,
        }
    }

    async fn fetch(&self, url: String, pagination: &mut PaginationState) -> WalkState {
        debug!("Fetching page {}", pagination.pages_fetched + 1);

        match self.fetcher.fetch_page(&url).await {
            Ok(page) => {
                let next = self.paginator.process_response(&page, pagination);
                info!(
                    "Retrieved {}/{} results...",
                    pagination.seen_events, page.total_count
                );

                match next {
                    NextPage::Continue { url: next_url } => {
                        info!("Still more results, retrieving next page...");
                        WalkState::WaitingToAdvance { next_url }
                    }
                    NextPage::Done => {
                        info!("End of results, exiting.");
                        WalkState::Finished(WalkOutcome::Exhausted)
                    }
                }
            }
            Err(e) if e.is_transient() => {
                let policy = self.config.retry_policy;
                if !policy.allows(pagination.consecutive_retries) {
                    let exhausted = Error::MaxRetriesExceeded {
                        max_retries: pagination.consecutive_retries,
                        last_error: e.to_string(),
                    };
                    return WalkState::Finished(fatal_outcome(url, &exhausted, e.status()));
                }

                pagination.record_retry();
                warn!(
                    "{} request failure, retrying same request in {:?} (retry {})",
                    e.status().unwrap_or_default(),
                    self.config.retry_delay,
                    pagination.consecutive_retries
                );
                WalkState::WaitingToRetry { url }
            }
            Err(e) => WalkState::Finished(fatal_outcome(url, &e, e.status())),
        }
    }
}

/// Log a fatal error for `url` and build the terminal outcome
pub fn fatal_outcome(url: String, err: &Error, status: Option<u16>) -> WalkOutcome {
    error!("Unexpected error retrieving results, exiting: {err}");
    error!("Last requested page was {url}");
    WalkOutcome::Failed {
        url,
        error: err.to_string(),
        status,
    }
}

#[cfg(test)]
mod tests;

//! Engine types
//!
//! Walk configuration, loop states and the final report.

use crate::pagination::PaginationState;
use std::time::Duration;

/// How many transient failures a single page may absorb
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive retries allowed on one URL (None = unlimited)
    pub max_retries: Option<u32>,
}

impl RetryPolicy {
    /// Retry forever
    pub fn unlimited() -> Self {
        Self { max_retries: None }
    }

    /// Give up after `max` consecutive retries on one URL
    pub fn limited(max: u32) -> Self {
        Self {
            max_retries: Some(max),
        }
    }

    /// Whether another retry is allowed after `consecutive` retries so far
    pub fn allows(&self, consecutive: u32) -> bool {
        self.max_retries.map_or(true, |max| consecutive < max)
    }
}

/// Configuration for a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkConfig {
    /// Wait before fetching the next page
    pub page_delay: Duration,
    /// Wait before retrying after a transient failure
    pub retry_delay: Duration,
    /// Retry cap
    pub retry_policy: RetryPolicy,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(5000),
            retry_delay: Duration::from_millis(10_000),
            retry_policy: RetryPolicy::unlimited(),
        }
    }
}

impl WalkConfig {
    /// Create a new walk config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay between pages
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Set the delay before a retry
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }
}

/// States of the walk loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkState {
    /// A request for `url` is about to be made
    Fetching {
        /// Page being fetched
        url: String,
    },
    /// Sleeping before fetching the next page
    WaitingToAdvance {
        /// Page to fetch after the delay
        next_url: String,
    },
    /// Sleeping before fetching the same page again
    WaitingToRetry {
        /// Page to fetch again after the delay
        url: String,
    },
    /// Terminal
    Finished(WalkOutcome),
}

impl WalkState {
    /// Check if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// How a walk ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkOutcome {
    /// The last page had no next link
    Exhausted,
    /// A fatal error stopped the walk
    Failed {
        /// URL that was being requested
        url: String,
        /// Error description
        error: String,
        /// HTTP status of the failing response, if any
        status: Option<u16>,
    },
}

impl WalkOutcome {
    /// Check if every page was retrieved
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }

    /// Check if the walk stopped on an error
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkReport {
    /// Terminal outcome
    pub outcome: WalkOutcome,
    /// Final totals
    pub state: PaginationState,
}

impl WalkReport {
    /// Records seen over the whole walk
    pub fn seen_events(&self) -> u64 {
        self.state.seen_events
    }
}

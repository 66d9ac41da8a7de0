//! Pagination types
//!
//! Response model and the accumulator threaded through a walk.

use crate::types::{JsonValue, OptionStringExt};
use serde::{Deserialize, Serialize};

/// One page of results from the events API
///
/// ```json
/// { "results": [...], "total_count": 1234, "links": { "next": "/api/v1/..." } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    /// Event records, opaque to the pager
    pub results: Vec<JsonValue>,
    /// Remote-reported number of events matching the query
    pub total_count: u64,
    /// Pagination links
    pub links: PageLinks,
}

/// Pagination links of a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    /// Relative URL of the next page; absent or null on the last page
    pub next: Option<String>,
}

impl PageResponse {
    /// Number of records on this page
    pub fn record_count(&self) -> usize {
        self.results.len()
    }

    /// Next page link, treating an empty string as absent
    pub fn next_link(&self) -> Option<String> {
        self.links.next.clone().none_if_empty()
    }
}

/// Result of processing a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available at this absolute URL
    Continue {
        /// Fully resolved URL of the next page
        url: String,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with a new URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::Continue { url: url.into() }
    }
}

/// Tracks progress during a walk
///
/// Only successful pages move `seen_events`, so retrying a page can never
/// count its records twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Records seen across all successful pages
    pub seen_events: u64,
    /// Total reported by the most recent successful page
    pub total_count: Option<u64>,
    /// Successful page fetches
    pub pages_fetched: u64,
    /// Transient failures retried over the whole walk
    pub retries: u64,
    /// Transient failures in a row on the current URL
    pub consecutive_retries: u32,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a successful page into the totals
    pub fn record_page(&mut self, page: &PageResponse) {
        self.seen_events += page.record_count() as u64;
        self.total_count = Some(page.total_count);
        self.pages_fetched += 1;
        self.consecutive_retries = 0;
    }

    /// Count a transient failure on the current URL
    pub fn record_retry(&mut self) {
        self.retries += 1;
        self.consecutive_retries += 1;
    }
}

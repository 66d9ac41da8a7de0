//! # event-pager
//!
//! Walks a cursor-paginated events API (the SparkPost Events API) page by
//! page, one request at a time.
//!
//! ## Features
//!
//! - **Next link pagination**: follows `links.next` until it is absent
//! - **Fixed throttling**: waits between pages to stay under rate limits
//! - **Retry on transient failure**: 429 and 5xx retry the same page
//! - **Clean termination**: fatal errors end the walk with a report, never a panic
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use event_pager::config::{EventQuery, PagerConfig};
//! use event_pager::engine::PageWalker;
//! use event_pager::http::HttpClient;
//!
//! #[tokio::main]
//! async fn main() -> event_pager::Result<()> {
//!     let config = PagerConfig::default();
//!     let query = EventQuery::default();
//!
//!     let client = HttpClient::with_config(config.http_config(&config.api_key()?))?;
//!     let walker = PageWalker::new(client, query.host.clone()).with_config(config.walk_config());
//!
//!     let report = walker.walk(&query.first_page_url()?).await;
//!     println!("{} events", report.seen_events());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            │                PageWalker                    │
//!            │  Fetching ─▶ WaitingToAdvance ─▶ Fetching    │
//!            │     │    └─▶ WaitingToRetry   ─▶ Fetching    │
//!            │     └─▶ Finished(Exhausted | Failed)         │
//!            └──────────────────────────────────────────────┘
//!                 │                     │
//!        ┌────────┴───────┐   ┌─────────┴─────────┐
//!        │  PageFetcher   │   │ NextLinkPaginator │
//!        │  (HttpClient)  │   │ PaginationState   │
//!        └────────────────┘   └───────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Event query and pager settings
pub mod config;

/// HTTP client for the events API
pub mod http;

/// Page model and next link resolution
pub mod pagination;

/// The walk loop
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::{EventQuery, PagerConfig};
pub use engine::{PageWalker, WalkOutcome, WalkReport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

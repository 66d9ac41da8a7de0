//! Pagination module
//!
//! Follows the `links.next` field of each page until it is absent.
//!
//! # Overview
//!
//! - `PageResponse` - shape of one page returned by the events API
//! - `PaginationState` - running totals owned by a single walk
//! - `NextLinkPaginator` - resolves relative next links against the API host

mod next_link;
mod types;

pub use next_link::{resolve_next_url, NextLinkPaginator};
pub use types::{NextPage, PageLinks, PageResponse, PaginationState};

//! Next link pagination
//!
//! The events API returns the next page as a path relative to the API host,
//! e.g. `/api/v1/events/message?cursor=WycyMDE4LTExLTA1VDIyOjQ1OjAwLjAwMFonLCAxNTQxNDU4MjcyNjM0MDAwXQ==`.

use super::types::{NextPage, PageResponse, PaginationState};
use tracing::debug;

/// Resolve a next-page link against the API host
///
/// The link is appended verbatim so the cursor encoding the API chose is
/// preserved. Absolute links are returned unchanged.
pub fn resolve_next_url(host: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        return link.to_string();
    }

    let host = host.trim_end_matches('/');
    if link.starts_with('/') {
        format!("{host}{link}")
    } else {
        format!("{host}/{link}")
    }
}

/// Follows `links.next` in the response body
#[derive(Debug, Clone)]
pub struct NextLinkPaginator {
    /// Scheme and host every relative link is resolved against
    pub host: String,
}

impl NextLinkPaginator {
    /// Create a new next link paginator
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    /// Record a successful page and decide where to go next
    pub fn process_response(&self, page: &PageResponse, state: &mut PaginationState) -> NextPage {
        state.record_page(page);

        match page.next_link() {
            Some(link) => {
                let url = resolve_next_url(&self.host, &link);
                debug!("Next page link {link} resolved to {url}");
                NextPage::with_url(url)
            }
            None => NextPage::Done,
        }
    }
}

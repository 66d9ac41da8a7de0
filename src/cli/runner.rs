//! CLI runner - wires settings, client and walker together

use crate::cli::commands::Cli;
use crate::config::{EventQuery, PagerConfig};
use crate::engine::{fatal_outcome, PageWalker, WalkReport};
use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::PaginationState;
use std::time::Instant;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Walk the built-in query
    ///
    /// Errors only when the settings cannot be loaded. A missing credential
    /// or a fatal page error is reported in the returned [`WalkReport`].
    pub async fn run(&self) -> Result<WalkReport> {
        let config = self.load_config()?;
        run_query(&config, &EventQuery::default()).await
    }

    /// Load settings: file (if any), then flag overrides
    pub fn load_config(&self) -> Result<PagerConfig> {
        let mut config = match &self.cli.config {
            Some(path) => PagerConfig::from_file(path)?,
            None => PagerConfig::default(),
        };
        self.cli.apply_overrides(&mut config);
        config.validate()?;
        debug!("Effective settings: {config:?}");
        Ok(config)
    }
}

/// Walk `query` with the given settings
///
/// A missing credential ends the walk before any request, as a fatal outcome
/// for the first page.
pub async fn run_query(config: &PagerConfig, query: &EventQuery) -> Result<WalkReport> {
    let first_page = query.first_page_url()?;
    let api_key = match config.api_key() {
        Ok(key) => key,
        Err(e) => {
            return Ok(WalkReport {
                outcome: fatal_outcome(first_page, &e, None),
                state: PaginationState::default(),
            })
        }
    };
    let client = HttpClient::with_config(config.http_config(&api_key))?;

    info!("Requesting first page: {first_page}");
    let start = Instant::now();

    let walker = PageWalker::new(client, query.host.clone()).with_config(config.walk_config());
    let report = walker.walk(&first_page).await;

    let summary = format!(
        "{} pages, {} events, {} retries in {:?}",
        report.state.pages_fetched,
        report.seen_events(),
        report.state.retries,
        start.elapsed()
    );
    if report.outcome.is_failed() {
        info!("Walk stopped early: {summary}");
    } else {
        info!("Walk complete: {summary}");
    }

    Ok(report)
}

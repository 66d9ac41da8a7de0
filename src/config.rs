//! Configuration for event-pager
//!
//! Two kinds of configuration live here:
//!
//! - [`EventQuery`]: the fixed query the pager walks. It is not user facing.
//! - [`PagerConfig`]: operational settings (delays, retry cap, timeout,
//!   credential variable), loadable from YAML and overridable from the CLI.

use crate::engine::{RetryPolicy, WalkConfig};
use crate::error::{Error, Result, ResultExt};
use crate::http::HttpClientConfig;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Host of the SparkPost API
pub const DEFAULT_HOST: &str = "https://api.sparkpost.com";

/// Path of the message events endpoint
pub const EVENTS_PATH: &str = "/api/v1/events/message";

/// Environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "SPARKPOST_API_KEY";

/// Timestamp format the events API expects for `from`/`to`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

// ============================================================================
// Event Query
// ============================================================================

/// The query for the first page of events
///
/// Defaults to clicks from `gmail.com` recipients over one UTC day,
/// 100 events per page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// Scheme and host; also used to resolve next links
    pub host: String,
    /// Event type filter
    pub events: String,
    /// Recipient domain filter
    pub recipient_domains: String,
    /// Initial pagination cursor
    pub cursor: String,
    /// Start of the date range (UTC)
    pub from: NaiveDateTime,
    /// End of the date range (UTC)
    pub to: NaiveDateTime,
    /// Timezone the range is expressed in
    pub timezone: String,
    /// Events per page
    pub per_page: u32,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            events: "click".to_string(),
            recipient_domains: "gmail.com".to_string(),
            cursor: "initial".to_string(),
            from: utc_minute(2019, 1, 6, 0, 0),
            to: utc_minute(2019, 1, 7, 23, 59),
            timezone: "UTC".to_string(),
            per_page: 100,
        }
    }
}

impl EventQuery {
    /// Point the query at another host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Fully qualified URL of the first page
    ///
    /// Query values are written as is (`from=2019-01-06T00:00`), not
    /// form-encoded.
    pub fn first_page_url(&self) -> Result<String> {
        let url = format!(
            "{}{EVENTS_PATH}?events={}&recipient_domains={}&cursor={}&from={}&to={}&timezone={}&per_page={}",
            self.host.trim_end_matches('/'),
            self.events,
            self.recipient_domains,
            self.cursor,
            self.from.format(TIMESTAMP_FORMAT),
            self.to.format(TIMESTAMP_FORMAT),
            self.timezone,
            self.per_page,
        );
        url::Url::parse(&url)?;
        Ok(url)
    }
}

fn utc_minute(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap_or_default()
}

// ============================================================================
// Pager Config
// ============================================================================

/// Operational settings for a walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagerConfig {
    /// Delay before fetching the next page (ms)
    pub page_delay_ms: u64,

    /// Delay before retrying after a transient failure (ms)
    pub retry_delay_ms: u64,

    /// Consecutive retries allowed per page (None = unlimited)
    pub max_retries: Option<u32>,

    /// Request timeout in seconds (0 = no timeout)
    pub request_timeout_secs: u64,

    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: 5000,
            retry_delay_ms: 10_000,
            max_retries: None,
            request_timeout_secs: 30,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

impl PagerConfig {
    /// Load settings from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.api_key_env.trim().is_empty() {
            return Err(Error::config("api_key_env must not be empty"));
        }
        Ok(())
    }

    /// Walk loop configuration
    pub fn walk_config(&self) -> WalkConfig {
        let retry_policy = match self.max_retries {
            Some(max) => RetryPolicy::limited(max),
            None => RetryPolicy::unlimited(),
        };
        WalkConfig::new()
            .with_page_delay(Duration::from_millis(self.page_delay_ms))
            .with_retry_delay(Duration::from_millis(self.retry_delay_ms))
            .with_retry_policy(retry_policy)
    }

    /// HTTP client configuration carrying the given credential
    pub fn http_config(&self, api_key: &str) -> HttpClientConfig {
        let builder = HttpClientConfig::builder().api_key(api_key);
        let builder = match self.request_timeout_secs {
            0 => builder.no_timeout(),
            secs => builder.timeout(Duration::from_secs(secs)),
        };
        builder.build()
    }

    /// Read the credential from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        read_api_key(&self.api_key_env)
    }
}

/// Read an API key from the environment
///
/// A missing, empty or non-unicode variable is an error.
pub fn read_api_key(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::missing_env(var)),
    }
}

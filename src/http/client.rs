//! HTTP client for the events API
//!
//! Provides a thin client that handles:
//! - Default headers (including the credential) on every request
//! - Request timeouts
//! - Response body parsing into [`PageResponse`]
//! - Turning non-2xx responses into status-carrying errors

use crate::error::{Error, Result};
use crate::pagination::PageResponse;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Source of pages for a walk
///
/// Implemented by [`HttpClient`]; tests provide scripted implementations.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch and decode the page at a fully qualified URL
    async fn fetch_page(&self, url: &str) -> Result<PageResponse>;
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout (None = wait forever)
    pub timeout: Option<Duration>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            default_headers: HashMap::new(),
            user_agent: format!("event-pager/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Disable the request timeout
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Send the API key as the `Authorization` header, verbatim
    pub fn api_key(self, key: impl Into<String>) -> Self {
        self.header(AUTHORIZATION.as_str(), key)
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client for the events API
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Make a GET request and parse the JSON body
    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut req = self.client.get(url).header(ACCEPT, "application/json");

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        debug!("GET {url}");
        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Request failed with {}: {url}", status.as_u16());
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body = response.text().await?;
        let json: T = serde_json::from_str(&body)?;
        debug!("Request succeeded: GET {url}");
        Ok(json)
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &str) -> Result<PageResponse> {
        self.get_json(url).await
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Header values are left out so the credential never reaches the logs
        f.debug_struct("HttpClient")
            .field("timeout", &self.config.timeout)
            .field("user_agent", &self.config.user_agent)
            .field(
                "headers",
                &self.config.default_headers.keys().collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

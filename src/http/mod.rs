//! HTTP client module
//!
//! Fetches one page of events per call.
//!
//! # Features
//!
//! - **Credential header**: the API key is sent verbatim on every request
//! - **Request timeout**: explicit, configurable, can be disabled
//! - **Status classification**: non-2xx responses become `Error::HttpStatus`
//!
//! Retrying is not done here; the walk loop decides what a failure means.

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, PageFetcher};

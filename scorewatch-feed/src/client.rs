//! HTTP client for the upstream feed.
//!
//! The upstream wraps each payload in a one-field JSON envelope:
//! `GET /api/state` answers `{"odds": "..."}` and `GET /api/mappings`
//! answers `{"mappings": "..."}`.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use scorewatch_core::constants::{
    DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS, MAPPINGS_PATH, STATE_PATH,
};
use scorewatch_core::error::{Result, WatchError};
use scorewatch_core::traits::FeedSource;

/// Feed client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedClientConfig {
    /// Base URL of the upstream (e.g. "http://localhost:3000")
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for FeedClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl FeedClientConfig {
    /// Creates config for the given base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_seconds = timeout.as_secs().max(1);
        self
    }
}

#[derive(Debug, Deserialize)]
struct StateEnvelope {
    odds: String,
}

#[derive(Debug, Deserialize)]
struct MappingsEnvelope {
    mappings: String,
}

/// Upstream feed over HTTP.
pub struct HttpFeedClient {
    config: FeedClientConfig,
    http_client: reqwest::Client,
}

impl HttpFeedClient {
    /// Creates a client with the given config.
    pub fn with_config(config: FeedClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| WatchError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Creates a client for `base_url` with default settings.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(FeedClientConfig::new(base_url))
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FeedClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http_client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| WatchError::fetch(path, e))?;

        if !response.status().is_success() {
            return Err(WatchError::UpstreamStatus {
                resource: path.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| WatchError::fetch(path, e))
    }
}

#[async_trait]
impl FeedSource for HttpFeedClient {
    #[instrument(skip(self))]
    async fn fetch_state(&self) -> Result<String> {
        let envelope: StateEnvelope = self.get_json(STATE_PATH).await?;
        debug!(bytes = envelope.odds.len(), "Fetched event state");
        Ok(envelope.odds)
    }

    #[instrument(skip(self))]
    async fn fetch_mappings(&self) -> Result<String> {
        let envelope: MappingsEnvelope = self.get_json(MAPPINGS_PATH).await?;
        debug!(bytes = envelope.mappings.len(), "Fetched name mappings");
        Ok(envelope.mappings)
    }
}

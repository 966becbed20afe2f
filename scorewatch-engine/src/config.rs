//! Monitor configuration.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use scorewatch_core::constants::{
    DEFAULT_API_URL, DEFAULT_MAPPING_TTL_SECS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STATE_TTL_MS,
};

/// Settings of the polling loop and its upstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Base URL of the upstream feed
    pub api_url: String,
    /// Delay between two reconciliation cycles
    pub poll_interval: Duration,
    /// How long a fetched name mapping is reused
    pub mapping_ttl: Duration,
    /// How long a fetched state is reused; zero fetches every cycle
    pub state_ttl: Duration,
    /// Upstream request timeout
    pub request_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            mapping_ttl: Duration::from_secs(DEFAULT_MAPPING_TTL_SECS),
            state_ttl: Duration::from_millis(DEFAULT_STATE_TTL_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl MonitorConfig {
    /// Reads the configuration from the environment, loading `.env` first.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `API_URL` | `http://localhost:3000` |
    /// | `POLL_INTERVAL_MS` | `1000` |
    /// | `MAPPING_TTL_SECS` | `120` |
    /// | `STATE_TTL_MS` | `0` |
    /// | `REQUEST_TIMEOUT_SECS` | `10` |
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            api_url: lookup("API_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.api_url),
            poll_interval: Duration::from_millis(parse_or(
                &lookup,
                "POLL_INTERVAL_MS",
                DEFAULT_POLL_INTERVAL_MS,
            ))
            .max(Duration::from_millis(1)),
            mapping_ttl: Duration::from_secs(parse_or(
                &lookup,
                "MAPPING_TTL_SECS",
                DEFAULT_MAPPING_TTL_SECS,
            )),
            state_ttl: Duration::from_millis(parse_or(
                &lookup,
                "STATE_TTL_MS",
                DEFAULT_STATE_TTL_MS,
            )),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
        }
    }

    /// Overrides the upstream URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Overrides the poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Parses `key`, keeping `default` when unset or invalid.
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
    }
}

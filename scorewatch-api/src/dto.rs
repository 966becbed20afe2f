//! DTOs for API requests and responses.

use serde::{Deserialize, Serialize};

/// Query parameters of `GET /client/state`.
#[derive(Debug, Default, Deserialize)]
pub struct StateQuery {
    /// Include events no longer reported upstream
    #[serde(default)]
    pub include_removed: bool,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Known events, removed ones included
    pub events: usize,
}

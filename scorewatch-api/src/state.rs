//! App state and server config.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use scorewatch_core::constants::{DEFAULT_API_PORT, DEFAULT_BIND_ADDR};
use scorewatch_core::error::{Result, WatchError};
use scorewatch_engine::ReconciliationEngine;

/// Where the API listens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    /// Interface to bind
    pub bind: String,
    /// TCP port
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDR.into(),
            port: DEFAULT_API_PORT,
        }
    }
}

impl ApiConfig {
    /// Reads `BIND_ADDR` and `PORT`, loading `.env` first.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Invalid PORT, using default");
                DEFAULT_API_PORT
            }),
            Err(_) => DEFAULT_API_PORT,
        };

        Self {
            bind: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into()),
            port,
        }
    }

    /// The socket address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .bind
            .parse()
            .map_err(|_| WatchError::ConfigError(format!("invalid bind address '{}'", self.bind)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// State shared by every handler.
pub struct AppState {
    /// Owner of the authoritative snapshot
    pub engine: Arc<ReconciliationEngine>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Creates state reading from `engine`.
    pub fn new(engine: Arc<ReconciliationEngine>) -> Self {
        Self {
            engine,
            started_at: Instant::now(),
        }
    }
}

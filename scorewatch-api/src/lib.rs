//! # scorewatch API Server
//!
//! Read-only REST API over the authoritative event snapshot.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness and snapshot size
//! - `GET /client/state` - Active events keyed by id (`?include_removed=true` for all)
//! - `GET /client/events/:id` - One event, removed or not
//! - `GET /client/stats` - Counts by status
//!
//! ## Example
//!
//! ```rust,ignore
//! use scorewatch_api::{ApiConfig, ApiServer};
//!
//! let config = ApiConfig::from_env();
//! let addr = config.socket_addr()?;
//! ApiServer::new(engine).run(addr).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use scorewatch_engine::ReconciliationEngine;

/// API server for scorewatch.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a server reading from `engine`.
    pub fn new(engine: Arc<ReconciliationEngine>) -> Self {
        Self {
            state: Arc::new(AppState::new(engine)),
        }
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address until `shutdown` resolves.
    pub async fn run_until(
        self,
        addr: impl Into<SocketAddr>,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("scorewatch API listening on {}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        self.run_until(addr, std::future::pending()).await
    }
}

//! API route configuration.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Snapshot reads
        .route("/client/state", get(handlers::get_state))
        .route("/client/events/:id", get(handlers::get_event))
        .route("/client/stats", get(handlers::get_stats))
        .with_state(state)
}

//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::debug;

use scorewatch_core::types::{EventRecord, Snapshot};
use scorewatch_engine::SnapshotStats;

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// GET /client/state
///
/// Active events keyed by id; `?include_removed=true` adds removed ones.
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StateQuery>,
) -> Json<Snapshot> {
    let snapshot = if params.include_removed {
        state.engine.current_snapshot().as_ref().clone()
    } else {
        state.engine.active_snapshot()
    };

    debug!(events = snapshot.len(), include_removed = params.include_removed, "Serving state");
    Json(snapshot)
}

/// GET /client/events/:id
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EventRecord>> {
    state
        .engine
        .event_by_id(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Event not found: {}", id)))
}

/// GET /client/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<SnapshotStats> {
    Json(state.engine.stats())
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        events: state.engine.current_snapshot().len(),
    })
}

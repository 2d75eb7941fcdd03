//! Read-only REST endpoints over the persisted baseline.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::assessment::ResultRecord;
use crate::assessment::catalog::SECTIONS;
use crate::assessment::result::{current_stage, is_initialized};
use crate::store::Storage;

/// Shared state for baseline routes.
#[derive(Clone)]
pub struct BaselineRouteState {
    pub store: Arc<dyn Storage>,
}

#[derive(Debug, Serialize)]
pub struct BaselineStatus {
    pub initialized: bool,
    pub current_stage: Option<u32>,
}

fn storage_failure(e: impl std::fmt::Display) -> Response {
    tracing::error!("Baseline lookup failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": "Storage unavailable"})),
    )
        .into_response()
}

/// GET /api/baseline
///
/// Returns the persisted result record, or 404 before the assessment has
/// been completed.
async fn get_baseline(State(state): State<BaselineRouteState>) -> Response {
    let ids: Vec<&str> = SECTIONS.iter().map(|s| s.id).collect();
    match ResultRecord::load(state.store.as_ref(), &ids).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Baseline not established yet"})),
        )
            .into_response(),
        Err(e) => storage_failure(e),
    }
}

/// GET /api/baseline/status
async fn get_status(State(state): State<BaselineRouteState>) -> Response {
    let store = state.store.as_ref();
    let initialized = match is_initialized(store).await {
        Ok(flag) => flag,
        Err(e) => return storage_failure(e),
    };
    let current_stage = match current_stage(store).await {
        Ok(stage) => stage,
        Err(e) => return storage_failure(e),
    };
    Json(BaselineStatus {
        initialized,
        current_stage,
    })
    .into_response()
}

/// Build the baseline REST routes.
pub fn baseline_routes(store: Arc<dyn Storage>) -> Router {
    Router::new()
        .route("/api/baseline", get(get_baseline))
        .route("/api/baseline/status", get(get_status))
        .with_state(BaselineRouteState { store })
}

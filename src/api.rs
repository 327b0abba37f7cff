// src/api.rs
//
// Thin read-only status surface. Nothing here feeds back into the tracker;
// it only snapshots what the last cycle left behind.

use std::sync::{Arc, RwLock};

use axum::{extract::State, routing::get, Json, Router};
use tower_http::cors::CorsLayer;

use crate::tracker::TrackerStatus;

#[derive(Clone)]
pub struct AppState {
    status: Arc<RwLock<TrackerStatus>>,
}

pub fn create_router(status: Arc<RwLock<TrackerStatus>>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/status", get(status_snapshot))
        .layer(CorsLayer::very_permissive())
        .with_state(AppState { status })
}

async fn status_snapshot(State(state): State<AppState>) -> Json<TrackerStatus> {
    let snap = state
        .status
        .read()
        .map(|s| s.clone())
        .unwrap_or_default();
    Json(snap)
}

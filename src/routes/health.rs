//! Health and cache maintenance handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cache: CacheStats,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        cache: state.cache.stats(),
    })
}

/// Drop a cached trip so the next quote sees fresh prices
pub async fn invalidate_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> StatusCode {
    state.cache.invalidate_trip(&trip_id).await;
    StatusCode::NO_CONTENT
}

/// Drop every cached trip and exchange rate
pub async fn invalidate_all(State(state): State<AppState>) -> StatusCode {
    state.cache.invalidate_all();
    StatusCode::NO_CONTENT
}

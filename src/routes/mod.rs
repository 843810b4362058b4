//! Service-level route handlers

pub mod bookings;
pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/bookings", post(bookings::create))
        .route("/api/cache", delete(health::invalidate_all))
        .route("/api/cache/trips/:trip_id", delete(health::invalidate_trip))
}

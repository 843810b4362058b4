//! Booking submission handler

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{BookingDraft, BookingPayload};
use crate::pricing::routes::build_payload;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BookingCreatedResponse {
    pub request_id: Uuid,
    pub booking: serde_json::Value,
    pub payload: BookingPayload,
}

/// Quote the draft, then forward the booking to the booking API
pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<BookingDraft>,
) -> Result<(StatusCode, Json<BookingCreatedResponse>)> {
    let request_id = Uuid::new_v4();
    let payload = build_payload(&state, &draft).await?;

    tracing::info!(
        %request_id,
        trip_id = %payload.trip_info,
        total_euro = %payload.total_price.euro,
        coupon = payload.coupon.as_ref().map(|c| c.code.as_str()).unwrap_or("-"),
        "Creating booking"
    );

    let booking = state.bookings.create_booking(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingCreatedResponse {
            request_id,
            booking,
            payload,
        }),
    ))
}

//! Pricing route handlers

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::models::{BookingDraft, BookingPayload};
use crate::AppState;

use super::models::PartySize;
use super::requests::{ApplyCouponRequest, QuoteRequest, SubtotalRequest, ValidateCouponQuery};
use super::responses::{
    CouponApplicationResponse, CouponValidationResponse, QuoteResponse, SubtotalResponse,
};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pricing/subtotal", post(subtotal))
        .route("/api/pricing/quote", post(quote))
        .route("/api/pricing/coupons/apply", post(apply_coupon))
        .route("/api/pricing/coupons/:code", get(validate_coupon))
        .route("/api/pricing/booking-payload", post(booking_payload))
}

/// Subtotal for a trip and party, before any coupon
async fn subtotal(
    State(state): State<AppState>,
    Json(req): Json<SubtotalRequest>,
) -> Result<Json<SubtotalResponse>> {
    let party = PartySize::new(req.adults, req.children)?;

    let (trip, subtotal) = services::subtotal_for_trip(
        &state.engine,
        state.trips.as_ref(),
        state.rates.as_ref(),
        &state.cache,
        &req.trip_id,
        party,
    )
    .await?;

    Ok(Json(SubtotalResponse::new(&trip, party, &subtotal)))
}

/// Full quote; a rejected coupon is reported in `coupon_error`, not as a failure
async fn quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let party = PartySize::new(req.adults, req.children)?;

    let (trip, quote) = services::quote_trip(
        &state.engine,
        state.trips.as_ref(),
        state.rates.as_ref(),
        &state.cache,
        &req.trip_id,
        party,
        req.coupon_code.as_deref(),
        req.as_of,
    )
    .await?;

    Ok(Json(QuoteResponse::new(&trip, &quote)))
}

/// Apply a coupon to a known base total
async fn apply_coupon(
    State(state): State<AppState>,
    Json(req): Json<ApplyCouponRequest>,
) -> Result<Json<CouponApplicationResponse>> {
    let applied = state
        .engine
        .apply_coupon(req.base_total_euro, &req.coupon_code, req.ticket_count, req.as_of)
        .await?;

    Ok(Json(applied.into()))
}

/// Check a coupon code without pricing anything
async fn validate_coupon(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<ValidateCouponQuery>,
) -> Result<Json<CouponValidationResponse>> {
    let coupon = state.engine.validate_coupon(&code, query.as_of).await?;
    Ok(Json(CouponValidationResponse::new(code.trim(), coupon)))
}

/// Quote a draft and assemble the booking-creation payload without submitting it
async fn booking_payload(
    State(state): State<AppState>,
    Json(draft): Json<BookingDraft>,
) -> Result<Json<BookingPayload>> {
    let payload = build_payload(&state, &draft).await?;
    Ok(Json(payload))
}

/// Quote a draft and embed the result into a booking payload.
///
/// Missing price data refuses checkout; a rejected coupon just drops the discount.
pub async fn build_payload(state: &AppState, draft: &BookingDraft) -> Result<BookingPayload> {
    let party = draft.party()?;
    let trip_id = draft.trip_id()?;

    let (_, quote) = services::quote_trip(
        &state.engine,
        state.trips.as_ref(),
        state.rates.as_ref(),
        &state.cache,
        trip_id,
        party,
        draft.coupon(),
        None,
    )
    .await?;

    if let Some(reason) = &quote.coupon_error {
        tracing::info!(trip_id, reason = %reason, "Booking proceeds without coupon");
    }

    Ok(BookingPayload::from_quote(draft, &quote)?)
}

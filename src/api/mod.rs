//! Booking API collaborators.
//!
//! Trips, coupons, exchange rates and bookings are owned by the external
//! booking API. Each concern is a trait so the pricing engine can be driven by
//! the reqwest [`ApiClient`] in production and by in-memory fakes in tests.

pub mod client;
pub mod types;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::BookingPayload;
use crate::pricing::models::{Coupon, Trip};

pub use client::ApiClient;
pub use types::ApiError;

/// Trip lookup by id
#[async_trait]
pub trait TripCatalog: Send + Sync {
    async fn fetch_trip(&self, trip_id: &str) -> Result<Trip, ApiError>;
}

/// Coupon validation and application
#[async_trait]
pub trait CouponService: Send + Sync {
    /// Resolve a coupon by code
    async fn validate(&self, code: &str) -> Result<Coupon, ApiError>;

    /// Resolve a coupon for a booking of `ticket_count` tickets.
    /// The service may reject codes on rules it owns (e.g. minimum tickets).
    async fn apply(&self, code: &str, ticket_count: u32) -> Result<Coupon, ApiError>;
}

/// EUR→EGP exchange rate
#[async_trait]
pub trait ExchangeRates: Send + Sync {
    async fn eur_to_egp(&self) -> Result<Decimal, ApiError>;
}

/// Booking creation
#[async_trait]
pub trait BookingService: Send + Sync {
    async fn create_booking(&self, payload: &BookingPayload) -> Result<serde_json::Value, ApiError>;
}

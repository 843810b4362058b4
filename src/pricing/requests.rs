//! Request DTOs for pricing API endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

fn default_adults() -> u32 {
    1
}

/// Request to compute a trip subtotal
#[derive(Debug, Deserialize)]
pub struct SubtotalRequest {
    pub trip_id: String,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
}

/// Request to quote a booking
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub trip_id: String,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

/// Request to apply a coupon to a known base total
#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    pub base_total_euro: Decimal,
    pub coupon_code: String,
    #[serde(default = "default_adults")]
    pub ticket_count: u32,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

/// Query parameters for coupon validation
#[derive(Debug, Default, Deserialize)]
pub struct ValidateCouponQuery {
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

//! Response DTOs for pricing API endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::display_subtotal;
use super::models::{
    AppliedCoupon, BookingQuote, Coupon, CouponApplication, Discount, DualAmount, EgpSource,
    PartySize, Subtotal, Trip,
};

/// EUR/EGP pair for JSON responses
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub euro: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub egp: Option<Decimal>,
}

impl From<DualAmount> for MoneyResponse {
    fn from(amount: DualAmount) -> Self {
        Self {
            euro: amount.euro,
            egp: amount.egp,
        }
    }
}

/// Response for subtotal calculation
#[derive(Debug, Serialize)]
pub struct SubtotalResponse {
    pub trip_id: String,
    pub adults: u32,
    pub children: u32,
    pub subtotal: MoneyResponse,
    pub egp_source: Option<EgpSource>,
}

impl SubtotalResponse {
    pub fn new(trip: &Trip, party: PartySize, subtotal: &Subtotal) -> Self {
        Self {
            trip_id: trip.id.clone(),
            adults: party.adults(),
            children: party.children(),
            subtotal: display_subtotal(subtotal).into(),
            egp_source: subtotal.egp_source,
        }
    }
}

/// Response for coupon application
#[derive(Debug, Serialize)]
pub struct CouponApplicationResponse {
    pub code: String,
    pub discount: Discount,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_total_euro: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_euro: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub final_total_euro: Decimal,
}

impl From<CouponApplication> for CouponApplicationResponse {
    fn from(applied: CouponApplication) -> Self {
        Self {
            code: applied.code,
            discount: applied.discount,
            base_total_euro: applied.base_total_euro,
            discount_euro: applied.discount_euro,
            final_total_euro: applied.final_total_euro,
        }
    }
}

/// Response for coupon validation
#[derive(Debug, Serialize)]
pub struct CouponValidationResponse {
    pub code: String,
    pub discount: Discount,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CouponValidationResponse {
    pub fn new(code: &str, coupon: Coupon) -> Self {
        Self {
            code: code.to_string(),
            discount: coupon.discount,
            expires_at: coupon.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AppliedCouponResponse {
    pub code: String,
    pub discount: MoneyResponse,
}

impl From<&AppliedCoupon> for AppliedCouponResponse {
    fn from(applied: &AppliedCoupon) -> Self {
        Self {
            code: applied.code.clone(),
            discount: applied.discount.into(),
        }
    }
}

/// Response for a booking quote
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub trip_id: String,
    pub trip_name: String,
    pub adults: u32,
    pub children: u32,
    pub subtotal: MoneyResponse,
    pub applied_coupon: Option<AppliedCouponResponse>,
    pub discount: MoneyResponse,
    pub total: MoneyResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_error: Option<String>,
}

impl QuoteResponse {
    pub fn new(trip: &Trip, quote: &BookingQuote) -> Self {
        Self {
            trip_id: quote.trip_id.clone(),
            trip_name: trip.name.clone(),
            adults: quote.party.adults(),
            children: quote.party.children(),
            subtotal: quote.subtotal.into(),
            applied_coupon: quote.applied_coupon.as_ref().map(Into::into),
            discount: quote.discount.into(),
            total: quote.total.into(),
            coupon_error: quote.coupon_error.clone(),
        }
    }
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_response_serializes_strings() {
        let json = serde_json::to_value(MoneyResponse {
            euro: dec!(108.00),
            egp: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"euro": "108.00", "egp": null}));
    }

    #[test]
    fn test_discount_is_tagged() {
        let json = serde_json::to_value(Discount::Percent { percent: dec!(10) }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "percent", "percent": "10"}));
    }
}

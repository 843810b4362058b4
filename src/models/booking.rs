//! Booking draft and booking-creation payload.
//!
//! The draft carries a customer's selections across pages without a backend
//! round trip. It is a plain value: every change returns a new draft, and
//! `clear()` resets it after checkout or when the customer abandons it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::models::{BookingQuote, DualAmount, PartySize};
use crate::pricing::PricingError;

/// Customer details forwarded to the booking API as `user`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Any further fields the booking form collects
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Booking selections in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    #[serde(default)]
    pub trip_id: Option<String>,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub transportation: bool,
    #[serde(default)]
    pub user: Option<Customer>,
    #[serde(default)]
    pub payment: Option<String>,
    #[serde(default)]
    pub booking_date: Option<NaiveDate>,
}

fn default_adults() -> u32 {
    1
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self {
            trip_id: None,
            adults: default_adults(),
            children: 0,
            coupon_code: None,
            transportation: false,
            user: None,
            payment: None,
            booking_date: None,
        }
    }
}

impl BookingDraft {
    /// Start a draft for a trip
    pub fn new(trip_id: impl Into<String>) -> Self {
        Self {
            trip_id: Some(trip_id.into()),
            ..Self::default()
        }
    }

    /// Switch trips; a coupon entered for the previous trip is dropped
    pub fn select_trip(self, trip_id: impl Into<String>) -> Self {
        Self {
            trip_id: Some(trip_id.into()),
            coupon_code: None,
            ..self
        }
    }

    pub fn with_party(self, adults: u32, children: u32) -> Self {
        Self {
            adults,
            children,
            ..self
        }
    }

    pub fn with_coupon(self, code: impl Into<String>) -> Self {
        Self {
            coupon_code: Some(code.into()),
            ..self
        }
    }

    pub fn without_coupon(self) -> Self {
        Self {
            coupon_code: None,
            ..self
        }
    }

    pub fn with_customer(self, user: Customer) -> Self {
        Self {
            user: Some(user),
            ..self
        }
    }

    pub fn with_checkout(self, payment: impl Into<String>, booking_date: NaiveDate, transportation: bool) -> Self {
        Self {
            payment: Some(payment.into()),
            booking_date: Some(booking_date),
            transportation,
            ..self
        }
    }

    /// Reset after checkout completes or the customer navigates away
    pub fn clear(self) -> Self {
        Self::default()
    }

    pub fn trip_id(&self) -> Result<&str, PricingError> {
        self.trip_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| missing("trip_id"))
    }

    pub fn party(&self) -> Result<PartySize, PricingError> {
        PartySize::new(self.adults, self.children)
    }

    /// Coupon code, if one was entered
    pub fn coupon(&self) -> Option<&str> {
        self.coupon_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

fn missing(field: &str) -> PricingError {
    PricingError::InvalidInput(format!("booking draft is missing {}", field))
}

/// Money pair as the booking API stores it (JSON numbers)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayloadAmount {
    #[serde(with = "rust_decimal::serde::float_option")]
    pub egp: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub euro: Decimal,
}

impl From<DualAmount> for PayloadAmount {
    fn from(amount: DualAmount) -> Self {
        Self {
            egp: amount.egp,
            euro: amount.euro,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadCoupon {
    pub code: String,
    pub discount: PayloadAmount,
}

/// Body of the booking-creation call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub trip_info: String,
    pub adult: u32,
    pub child: u32,
    pub subtotal: PayloadAmount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<PayloadCoupon>,
    pub total_price: PayloadAmount,
    pub transportation: bool,
    pub user: Customer,
    pub payment: String,
    pub check_in: bool,
    pub booking_date: NaiveDate,
}

impl BookingPayload {
    /// Embed a quote into a booking-creation payload.
    ///
    /// New bookings are never checked in; the gate flips `checkIn` later.
    pub fn from_quote(draft: &BookingDraft, quote: &BookingQuote) -> Result<Self, PricingError> {
        let user = draft.user.clone().ok_or_else(|| missing("user"))?;
        let payment = draft
            .payment
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| missing("payment"))?;
        let booking_date = draft.booking_date.ok_or_else(|| missing("booking_date"))?;

        Ok(Self {
            trip_info: quote.trip_id.clone(),
            adult: quote.party.adults(),
            child: quote.party.children(),
            subtotal: quote.subtotal.into(),
            coupon: quote.applied_coupon.as_ref().map(|applied| PayloadCoupon {
                code: applied.code.clone(),
                discount: applied.discount.into(),
            }),
            total_price: quote.total.into(),
            transportation: draft.transportation,
            user,
            payment,
            check_in: false,
            booking_date,
        })
    }
}

//! Pricing service functions with collaborator access.
//!
//! `PricingEngine` owns the coupon rules; the free functions below resolve the
//! trip and exchange rate through the booking API and cache before quoting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::api::{ApiError, CouponService, ExchangeRates, TripCatalog};
use crate::cache::AppCache;

use super::calculators::{
    compute_subtotal, discount_euro, display_subtotal, egp_discount, has_egp_table, settle_total,
};
use super::models::{
    AppliedCoupon, BookingQuote, Coupon, CouponApplication, Discount, DualAmount, PartySize,
    PricingOptions, Subtotal, Trip,
};

/// Pricing calculation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// Bad, expired or inactive code, or the coupon service timed out
    #[error("Invalid coupon: {reason}")]
    InvalidCoupon { reason: String },

    /// Trip record lacks a price the quote needs
    #[error("Trip {trip_id} is missing price data: {field}")]
    MissingPriceData { trip_id: String, field: String },

    /// Coupon or currency-rate collaborator unreachable
    #[error("Pricing collaborator unavailable: {0}")]
    Network(String),

    #[error("Trip {trip_id} not found")]
    TripNotFound { trip_id: String },

    /// Trip lookup failed for any other reason
    #[error("Trip {trip_id} unavailable: {reason}")]
    TripUnavailable { trip_id: String, reason: String },

    #[error("Invalid pricing input: {0}")]
    InvalidInput(String),
}

impl PricingError {
    /// Errors that leave the booking flow usable without a discount
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PricingError::InvalidCoupon { .. } | PricingError::Network(_)
        )
    }

    /// Short message suitable for inline display next to the coupon input
    pub fn user_message(&self) -> String {
        match self {
            PricingError::InvalidCoupon { reason } => reason.clone(),
            PricingError::Network(_) => {
                "Coupon could not be checked right now, no discount applied".to_string()
            }
            other => other.to_string(),
        }
    }

    fn invalid_coupon(reason: impl Into<String>) -> Self {
        PricingError::InvalidCoupon {
            reason: reason.into(),
        }
    }

    /// Map a coupon-service failure onto the pricing taxonomy
    fn from_coupon_lookup(err: ApiError) -> Self {
        match err {
            ApiError::Rejected(message) | ApiError::NotFound(message) => Self::invalid_coupon(message),
            ApiError::Timeout => Self::invalid_coupon("Coupon validation timed out"),
            ApiError::Decode(detail) => {
                warn!(detail = %detail, "Coupon service returned an unreadable coupon");
                Self::invalid_coupon("Coupon could not be read")
            }
            ApiError::Transport(detail) => PricingError::Network(detail),
        }
    }
}

/// Coupon and total computation for bookings.
///
/// Holds no mutable state; concurrent quotes never interact.
#[derive(Clone)]
pub struct PricingEngine {
    coupons: Arc<dyn CouponService>,
    options: PricingOptions,
}

impl PricingEngine {
    pub fn new(coupons: Arc<dyn CouponService>, options: PricingOptions) -> Self {
        Self { coupons, options }
    }

    pub fn options(&self) -> PricingOptions {
        self.options
    }

    /// Base subtotal for a party, see [`compute_subtotal`]
    pub fn compute_subtotal(
        &self,
        trip: &Trip,
        party: PartySize,
        eur_to_egp: Option<Decimal>,
    ) -> Result<Subtotal, PricingError> {
        compute_subtotal(trip, party, eur_to_egp, self.options.missing_price)
    }

    /// Resolve a coupon by code and check it is usable at `as_of` (default: now)
    pub async fn validate_coupon(
        &self,
        coupon_code: &str,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Coupon, PricingError> {
        let code = require_code(coupon_code)?;
        let coupon = self
            .coupons
            .validate(code)
            .await
            .map_err(PricingError::from_coupon_lookup)?;

        check_coupon(&coupon, as_of.unwrap_or_else(Utc::now))?;
        Ok(coupon)
    }

    /// Apply one coupon to a EUR base total.
    ///
    /// # Arguments
    /// * `base_total_euro` - Subtotal at full precision, must be non-negative
    /// * `coupon_code` - Code as entered, compared case-sensitively
    /// * `party_size_total` - Ticket count forwarded to the coupon service
    /// * `as_of` - Point in time for the expiry check (default: now)
    pub async fn apply_coupon(
        &self,
        base_total_euro: Decimal,
        coupon_code: &str,
        party_size_total: u32,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<CouponApplication, PricingError> {
        if base_total_euro < Decimal::ZERO {
            return Err(PricingError::InvalidInput(format!(
                "base total must be non-negative, got {}",
                base_total_euro
            )));
        }

        let code = require_code(coupon_code)?;
        let coupon = self
            .coupons
            .apply(code, party_size_total)
            .await
            .map_err(PricingError::from_coupon_lookup)?;

        check_coupon(&coupon, as_of.unwrap_or_else(Utc::now))?;

        let raw = discount_euro(base_total_euro, &coupon.discount)?;
        let (deducted, final_total) = settle_total(base_total_euro, raw);

        debug!(
            code,
            base = %base_total_euro,
            discount = %deducted,
            total = %final_total,
            "Coupon applied"
        );

        Ok(CouponApplication {
            code: code.to_string(),
            discount: coupon.discount,
            base_total_euro,
            discount_euro: deducted,
            final_total_euro: final_total,
        })
    }

    /// Price a booking: subtotal, then the coupon when a code is given.
    ///
    /// A coupon that cannot be applied never fails the quote: the result is the
    /// undiscounted subtotal with `coupon_error` set. Missing price data does.
    pub async fn quote(
        &self,
        trip: &Trip,
        party: PartySize,
        coupon_code: Option<&str>,
        eur_to_egp: Option<Decimal>,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<BookingQuote, PricingError> {
        let subtotal = self.compute_subtotal(trip, party, eur_to_egp)?;
        let shown = display_subtotal(&subtotal);

        let undiscounted = |coupon_error: Option<String>| BookingQuote {
            trip_id: trip.id.clone(),
            party,
            subtotal: shown,
            applied_coupon: None,
            discount: DualAmount {
                euro: Decimal::ZERO,
                egp: shown.egp.map(|_| Decimal::ZERO),
            },
            total: shown,
            coupon_error,
        };

        let code = match coupon_code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => code,
            None => return Ok(undiscounted(None)),
        };

        match self
            .apply_coupon(subtotal.euro, code, party.total(), as_of)
            .await
        {
            Ok(applied) => {
                let egp_off = egp_discount(
                    subtotal.egp,
                    subtotal.euro,
                    applied.discount_euro,
                    self.options.egp_discount,
                );
                let discount = DualAmount {
                    euro: applied.discount_euro,
                    egp: egp_off,
                };

                Ok(BookingQuote {
                    trip_id: trip.id.clone(),
                    party,
                    subtotal: shown,
                    applied_coupon: Some(AppliedCoupon {
                        code: applied.code,
                        discount,
                    }),
                    discount,
                    total: DualAmount {
                        euro: applied.final_total_euro,
                        egp: shown.egp.zip(egp_off).map(|(egp, off)| egp - off),
                    },
                    coupon_error: None,
                })
            }
            Err(err) if err.is_recoverable() => {
                match &err {
                    PricingError::Network(detail) => {
                        warn!(trip_id = %trip.id, code, detail = %detail, "Coupon service unavailable, quoting without discount")
                    }
                    _ => info!(trip_id = %trip.id, code, reason = %err, "Coupon rejected"),
                }
                Ok(undiscounted(Some(err.user_message())))
            }
            Err(err) => Err(err),
        }
    }
}

fn require_code(coupon_code: &str) -> Result<&str, PricingError> {
    let code = coupon_code.trim();
    if code.is_empty() {
        return Err(PricingError::invalid_coupon("Coupon code is required"));
    }
    Ok(code)
}

/// Local checks on a coupon the service resolved
fn check_coupon(coupon: &Coupon, check_time: DateTime<Utc>) -> Result<(), PricingError> {
    if !coupon.active {
        return Err(PricingError::invalid_coupon("Coupon is not active"));
    }
    if coupon.is_expired_at(check_time) {
        return Err(PricingError::invalid_coupon("Coupon has expired"));
    }

    match coupon.discount {
        Discount::Percent { percent } if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED => {
            Err(PricingError::invalid_coupon(format!(
                "Coupon percent {} is out of range",
                percent
            )))
        }
        Discount::Amount { euro, egp }
            if euro < Decimal::ZERO || egp.is_some_and(|e| e < Decimal::ZERO) =>
        {
            Err(PricingError::invalid_coupon("Coupon amount is negative"))
        }
        _ => Ok(()),
    }
}

/// Resolve a trip by id, from cache when possible.
pub async fn resolve_trip(
    catalog: &dyn TripCatalog,
    cache: &AppCache,
    trip_id: &str,
) -> Result<Arc<Trip>, PricingError> {
    if let Some(cached) = cache.trips.get(trip_id).await {
        debug!("Cache HIT for trip: {}", trip_id);
        return Ok(cached);
    }
    debug!("Cache MISS for trip: {}", trip_id);

    let trip = catalog.fetch_trip(trip_id).await.map_err(|e| match e {
        ApiError::NotFound(_) => PricingError::TripNotFound {
            trip_id: trip_id.to_string(),
        },
        other => PricingError::TripUnavailable {
            trip_id: trip_id.to_string(),
            reason: other.to_string(),
        },
    })?;

    let trip = Arc::new(trip);
    cache.trips.insert(trip_id.to_string(), trip.clone()).await;
    Ok(trip)
}

/// Current EUR→EGP rate, from cache when possible.
///
/// A rate failure only costs the EGP side of a quote, so it is logged and
/// reported as `None`.
pub async fn resolve_eur_egp_rate(rates: &dyn ExchangeRates, cache: &AppCache) -> Option<Decimal> {
    if let Some(rate) = cache.rates.get(AppCache::EUR_EGP).await {
        return Some(rate);
    }

    match rates.eur_to_egp().await {
        Ok(rate) => {
            cache.rates.insert(AppCache::EUR_EGP.to_string(), rate).await;
            Some(rate)
        }
        Err(e) => {
            warn!("EUR->EGP rate unavailable, EGP prices omitted: {}", e);
            None
        }
    }
}

/// Rate needed for this trip and party, fetched only when the EGP table is incomplete
async fn rate_for(
    rates: &dyn ExchangeRates,
    cache: &AppCache,
    trip: &Trip,
    party: PartySize,
) -> Option<Decimal> {
    if has_egp_table(trip, party) {
        None
    } else {
        resolve_eur_egp_rate(rates, cache).await
    }
}

/// Subtotal for a trip looked up by id
pub async fn subtotal_for_trip(
    engine: &PricingEngine,
    catalog: &dyn TripCatalog,
    rates: &dyn ExchangeRates,
    cache: &AppCache,
    trip_id: &str,
    party: PartySize,
) -> Result<(Arc<Trip>, Subtotal), PricingError> {
    let trip = resolve_trip(catalog, cache, trip_id).await?;
    let rate = rate_for(rates, cache, &trip, party).await;
    let subtotal = engine.compute_subtotal(&trip, party, rate)?;
    Ok((trip, subtotal))
}

/// Quote for a trip looked up by id
pub async fn quote_trip(
    engine: &PricingEngine,
    catalog: &dyn TripCatalog,
    rates: &dyn ExchangeRates,
    cache: &AppCache,
    trip_id: &str,
    party: PartySize,
    coupon_code: Option<&str>,
    as_of: Option<DateTime<Utc>>,
) -> Result<(Arc<Trip>, BookingQuote), PricingError> {
    let trip = resolve_trip(catalog, cache, trip_id).await?;
    let rate = rate_for(rates, cache, &trip, party).await;
    let quote = engine.quote(&trip, party, coupon_code, rate, as_of).await?;
    Ok((trip, quote))
}

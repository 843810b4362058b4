//! Core pricing calculation functions.
//!
//! Pure functions for booking math - no network access. The coupon lookup and
//! exchange-rate resolution live in `services`.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use super::models::{
    Discount, DualAmount, EgpDiscountPolicy, EgpSource, MissingPricePolicy, PartySize, Subtotal,
    TravelerCategory, Trip,
};
use super::services::PricingError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use tripbook_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Compute the base subtotal for a party.
///
/// EUR is always priced from the trip's price table. EGP is priced from the
/// table when every EGP price the party needs is set, otherwise converted from
/// the EUR subtotal with `eur_to_egp` when a rate is available.
///
/// # Arguments
/// * `trip` - Trip with its price table
/// * `party` - Adults and children on the booking
/// * `eur_to_egp` - Optional EUR→EGP rate used when the EGP table is incomplete
/// * `missing_price` - What an unset EUR price means
pub fn compute_subtotal(
    trip: &Trip,
    party: PartySize,
    eur_to_egp: Option<Decimal>,
    missing_price: MissingPricePolicy,
) -> Result<Subtotal, PricingError> {
    let adult_euro = unit_price_euro(trip, TravelerCategory::Adult, missing_price)?;
    let child_euro = if party.children() > 0 {
        unit_price_euro(trip, TravelerCategory::Child, missing_price)?
    } else {
        Decimal::ZERO
    };

    let euro = weighted_sum(party, adult_euro, child_euro)?;

    let (egp, egp_source) = match table_egp(trip, party)? {
        Some(egp) => (Some(egp), Some(EgpSource::PriceTable)),
        None => match eur_to_egp {
            Some(rate) => (
                Some(euro.checked_mul(rate).ok_or_else(|| overflow("EGP subtotal"))?),
                Some(EgpSource::ExchangeRate),
            ),
            None => (None, None),
        },
    };

    Ok(Subtotal {
        euro,
        egp,
        egp_source,
    })
}

/// Whether EGP can be priced directly from the trip's table for this party
pub fn has_egp_table(trip: &Trip, party: PartySize) -> bool {
    matches!(table_egp(trip, party), Ok(Some(_)))
}

/// EGP subtotal from the price table; `None` when a needed EGP price is unset
fn table_egp(trip: &Trip, party: PartySize) -> Result<Option<Decimal>, PricingError> {
    let adult = match unit_price_egp(trip, TravelerCategory::Adult)? {
        Some(price) => price,
        None => return Ok(None),
    };
    let child = if party.children() > 0 {
        match unit_price_egp(trip, TravelerCategory::Child)? {
            Some(price) => price,
            None => return Ok(None),
        }
    } else {
        Decimal::ZERO
    };
    weighted_sum(party, adult, child).map(Some)
}

fn weighted_sum(party: PartySize, adult: Decimal, child: Decimal) -> Result<Decimal, PricingError> {
    let adults = Decimal::from(party.adults()).checked_mul(adult);
    let children = Decimal::from(party.children()).checked_mul(child);

    adults
        .zip(children)
        .and_then(|(a, c)| a.checked_add(c))
        .ok_or_else(|| overflow("subtotal"))
}

fn overflow(what: &str) -> PricingError {
    PricingError::InvalidInput(format!("{} exceeds the supported amount range", what))
}

fn negative_price(trip: &Trip, field: String) -> PricingError {
    PricingError::MissingPriceData {
        trip_id: trip.id.clone(),
        field: format!("{} is negative", field),
    }
}

fn unit_price_egp(trip: &Trip, category: TravelerCategory) -> Result<Option<Decimal>, PricingError> {
    match trip.prices.category(category).egp {
        Some(amount) if amount < Decimal::ZERO => {
            Err(negative_price(trip, format!("prices.{}.egp", category)))
        }
        price => Ok(price),
    }
}

fn unit_price_euro(
    trip: &Trip,
    category: TravelerCategory,
    policy: MissingPricePolicy,
) -> Result<Decimal, PricingError> {
    let field = format!("prices.{}.euro", category);

    match (trip.prices.category(category).euro, policy) {
        (Some(amount), _) if amount < Decimal::ZERO => Err(negative_price(trip, field)),
        (Some(amount), _) => Ok(amount),
        (None, MissingPricePolicy::TreatAsZero) => {
            tracing::warn!(trip_id = %trip.id, field = %field, "Trip price missing, pricing category at zero");
            Ok(Decimal::ZERO)
        }
        (None, MissingPricePolicy::Reject) => Err(PricingError::MissingPriceData {
            trip_id: trip.id.clone(),
            field,
        }),
    }
}

/// Raw EUR discount for a coupon against `base_total_euro`, clamped to `[0, base]`.
///
/// Full precision; the caller settles it against the base with [`settle_total`].
pub fn discount_euro(base_total_euro: Decimal, discount: &Discount) -> Result<Decimal, PricingError> {
    let raw = match discount {
        Discount::Amount { euro, .. } => *euro,
        Discount::Percent { percent } => (*percent / HUNDRED)
            .checked_mul(base_total_euro)
            .ok_or_else(|| overflow("discount"))?,
    };
    Ok(raw.max(Decimal::ZERO).min(base_total_euro.max(Decimal::ZERO)))
}

/// Settle a clamped discount against the base total.
///
/// Returns `(deducted, final_total)` at display precision. The deducted amount
/// is derived from the rounded totals so `round(base) - deducted == final`.
pub fn settle_total(base_total_euro: Decimal, discount: Decimal) -> (Decimal, Decimal) {
    let final_total = round_money(base_total_euro - discount, 2).max(Decimal::ZERO);
    let deducted = round_money(base_total_euro, 2) - final_total;
    (deducted.max(Decimal::ZERO), final_total)
}

/// EGP discount matching a settled EUR discount.
///
/// `None` when the subtotal has no EGP side.
pub fn egp_discount(
    subtotal_egp: Option<Decimal>,
    base_total_euro: Decimal,
    deducted_euro: Decimal,
    policy: EgpDiscountPolicy,
) -> Option<Decimal> {
    let egp = round_money(subtotal_egp?, 2);

    let discount = match policy {
        EgpDiscountPolicy::Undiscounted => Decimal::ZERO,
        EgpDiscountPolicy::Proportional => {
            let base = round_money(base_total_euro, 2);
            if base <= Decimal::ZERO {
                Decimal::ZERO
            } else if deducted_euro >= base {
                egp
            } else {
                // deducted < base, so the ratio form cannot overflow
                let share = egp
                    .checked_mul(deducted_euro)
                    .and_then(|p| p.checked_div(base))
                    .unwrap_or_else(|| egp * (deducted_euro / base));
                round_money(share, 2)
            }
        }
    };

    Some(discount.min(egp).max(Decimal::ZERO))
}

/// Round a subtotal to display precision
pub fn display_subtotal(subtotal: &Subtotal) -> DualAmount {
    DualAmount {
        euro: round_money(subtotal.euro, 2),
        egp: subtotal.egp.map(|egp| round_money(egp, 2)),
    }
}

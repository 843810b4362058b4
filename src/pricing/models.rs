//! Domain models for trip pricing.
//!
//! Trips and coupons are owned by the booking API; these types describe the
//! subset of their records the pricing engine reads. Wire shapes are decoded
//! leniently (prices may be missing) so the engine, not serde, decides what a
//! missing price means.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::services::PricingError;

/// Bookable trip with its per-category price table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub prices: PriceTable,
}

/// Prices keyed by traveler category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    #[serde(default)]
    pub adult: CategoryPrice,
    #[serde(default)]
    pub child: CategoryPrice,
}

impl PriceTable {
    pub fn category(&self, category: TravelerCategory) -> &CategoryPrice {
        match category {
            TravelerCategory::Adult => &self.adult,
            TravelerCategory::Child => &self.child,
        }
    }
}

/// Unit price for one traveler category in both currencies
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryPrice {
    #[serde(default)]
    pub egp: Option<Decimal>,
    #[serde(default)]
    pub euro: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelerCategory {
    Adult,
    Child,
}

impl fmt::Display for TravelerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelerCategory::Adult => write!(f, "adult"),
            TravelerCategory::Child => write!(f, "child"),
        }
    }
}

/// Number of travelers on a booking. A booking needs at least one adult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartySize {
    adults: u32,
    children: u32,
}

impl PartySize {
    pub fn new(adults: u32, children: u32) -> Result<Self, PricingError> {
        if adults == 0 {
            return Err(PricingError::InvalidInput(
                "a booking requires at least one adult".to_string(),
            ));
        }
        if adults.checked_add(children).is_none() {
            return Err(PricingError::InvalidInput(format!(
                "party of {} adults and {} children is too large",
                adults, children
            )));
        }
        Ok(Self { adults, children })
    }

    pub fn adults(&self) -> u32 {
        self.adults
    }

    pub fn children(&self) -> u32 {
        self.children
    }

    /// Ticket count passed to the coupon service; fits `u32` by construction
    pub fn total(&self) -> u32 {
        self.adults + self.children
    }
}

/// Discount carried by a coupon. The kind is fixed when the coupon is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discount {
    /// Flat deduction, independent of party size
    Amount { egp: Option<Decimal>, euro: Decimal },
    /// Percentage of the subtotal, in [0, 100]
    Percent { percent: Decimal },
}

/// Coupon as resolved by the coupon service
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "CouponRecord")]
pub struct Coupon {
    pub code: String,
    pub discount: Discount,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl Coupon {
    pub fn is_expired_at(&self, check_time: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expiry) => expiry <= check_time,
            None => false,
        }
    }
}

/// Raw coupon payload: `{type, discount: {egp, euro} | {percent}, ...}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CouponRecord {
    #[serde(default)]
    code: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    discount: DiscountRecord,
    #[serde(default, alias = "expirationDate", alias = "expiration")]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active", alias = "isActive")]
    active: bool,
}

#[derive(Debug, Deserialize)]
struct DiscountRecord {
    #[serde(default)]
    egp: Option<Decimal>,
    #[serde(default)]
    euro: Option<Decimal>,
    #[serde(default)]
    percent: Option<Decimal>,
}

fn default_active() -> bool {
    true
}

impl TryFrom<CouponRecord> for Coupon {
    type Error = String;

    fn try_from(record: CouponRecord) -> Result<Self, Self::Error> {
        let DiscountRecord {
            egp,
            euro,
            percent,
        } = record.discount;

        let discount = match record.kind.as_str() {
            "amount" => {
                if percent.is_some() {
                    return Err("amount coupon must not carry a percent".to_string());
                }
                let euro = euro.ok_or("amount coupon is missing discount.euro")?;
                Discount::Amount { egp, euro }
            }
            "percent" => {
                if egp.is_some() || euro.is_some() {
                    return Err("percent coupon must not carry fixed amounts".to_string());
                }
                let percent = percent.ok_or("percent coupon is missing discount.percent")?;
                Discount::Percent { percent }
            }
            other => return Err(format!("unknown coupon type '{}'", other)),
        };

        Ok(Coupon {
            code: record.code.unwrap_or_default(),
            discount,
            expires_at: record.expires_at,
            active: record.active,
        })
    }
}

/// Where the EGP side of a subtotal came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EgpSource {
    PriceTable,
    ExchangeRate,
}

/// Party-weighted sum of unit prices, before discount.
///
/// `euro` is kept at full precision; round with [`round_money`] for display.
///
/// [`round_money`]: super::calculators::round_money
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subtotal {
    pub euro: Decimal,
    pub egp: Option<Decimal>,
    pub egp_source: Option<EgpSource>,
}

/// A pair of amounts, EUR always present, EGP when it could be priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DualAmount {
    pub euro: Decimal,
    pub egp: Option<Decimal>,
}

/// Coupon recorded against a booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount: DualAmount,
}

/// Outcome of applying one coupon to a EUR base total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponApplication {
    pub code: String,
    pub discount: Discount,
    pub base_total_euro: Decimal,
    /// Amount actually deducted, at display precision
    pub discount_euro: Decimal,
    pub final_total_euro: Decimal,
}

/// Price breakdown for one trip, party size and optional coupon.
///
/// Produced fresh for every request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingQuote {
    pub trip_id: String,
    pub party: PartySize,
    pub subtotal: DualAmount,
    pub applied_coupon: Option<AppliedCoupon>,
    pub discount: DualAmount,
    pub total: DualAmount,
    /// Why a requested coupon was not applied
    pub coupon_error: Option<String>,
}

/// How the EGP side of a discounted total is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum EgpDiscountPolicy {
    /// EGP subtotal reduced by the same fraction as the EUR subtotal
    #[default]
    Proportional,
    /// EGP total stays at the EGP subtotal
    Undiscounted,
}

/// What an unset adult/child price means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum MissingPricePolicy {
    /// Refuse to quote
    #[default]
    Reject,
    /// Price the category at zero
    TreatAsZero,
}

impl FromStr for EgpDiscountPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proportional" => Ok(Self::Proportional),
            "undiscounted" => Ok(Self::Undiscounted),
            other => Err(format!(
                "unknown EGP discount policy '{}' (expected proportional or undiscounted)",
                other
            )),
        }
    }
}

impl FromStr for MissingPricePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "zero" | "treat_as_zero" => Ok(Self::TreatAsZero),
            other => Err(format!(
                "unknown missing-price policy '{}' (expected reject or zero)",
                other
            )),
        }
    }
}

impl TryFrom<String> for EgpDiscountPolicy {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<String> for MissingPricePolicy {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PricingOptions {
    pub egp_discount: EgpDiscountPolicy,
    pub missing_price: MissingPricePolicy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_party_size_requires_an_adult() {
        assert!(PartySize::new(0, 2).is_err());
        let party = PartySize::new(2, 1).unwrap();
        assert_eq!(party.total(), 3);
    }

    #[test]
    fn test_party_size_total_must_fit() {
        assert!(matches!(
            PartySize::new(u32::MAX, 1),
            Err(PricingError::InvalidInput(_))
        ));
        assert_eq!(PartySize::new(u32::MAX, 0).unwrap().total(), u32::MAX);
    }

    #[test]
    fn test_trip_decodes_mongo_style_id_and_numeric_prices() {
        let trip: Trip = serde_json::from_value(serde_json::json!({
            "_id": "665f",
            "name": "Luxor day trip",
            "prices": {
                "adult": { "egp": 2500, "euro": 50 },
                "child": { "egp": 1000.5, "euro": 20 }
            }
        }))
        .unwrap();

        assert_eq!(trip.id, "665f");
        assert_eq!(trip.prices.adult.euro, Some(dec!(50)));
        assert_eq!(trip.prices.child.egp, Some(dec!(1000.5)));
    }

    #[test]
    fn test_trip_with_missing_prices_still_decodes() {
        let trip: Trip = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "prices": { "adult": { "euro": 30 } }
        }))
        .unwrap();

        assert_eq!(trip.prices.adult.egp, None);
        assert_eq!(trip.prices.child, CategoryPrice::default());
    }

    #[test]
    fn test_coupon_amount_shape() {
        let coupon: Coupon = serde_json::from_value(serde_json::json!({
            "code": "NILE200",
            "type": "amount",
            "discount": { "egp": 10000, "euro": 200 },
            "expirationDate": "2030-01-01T00:00:00Z",
            "active": true
        }))
        .unwrap();

        assert_eq!(
            coupon.discount,
            Discount::Amount {
                egp: Some(dec!(10000)),
                euro: dec!(200)
            }
        );
        assert!(coupon.active);
        assert!(coupon.expires_at.is_some());
    }

    #[test]
    fn test_coupon_percent_shape_defaults_active() {
        let coupon: Coupon = serde_json::from_value(serde_json::json!({
            "type": "percent",
            "discount": { "percent": 10 }
        }))
        .unwrap();

        assert_eq!(coupon.discount, Discount::Percent { percent: dec!(10) });
        assert!(coupon.active);
        assert_eq!(coupon.code, "");
    }

    #[test]
    fn test_coupon_rejects_mixed_shapes() {
        let mixed = serde_json::json!({
            "type": "percent",
            "discount": { "percent": 10, "euro": 5 }
        });
        assert!(serde_json::from_value::<Coupon>(mixed).is_err());

        let mixed = serde_json::json!({
            "type": "amount",
            "discount": { "euro": 5, "percent": 10 }
        });
        assert!(serde_json::from_value::<Coupon>(mixed).is_err());

        let unknown = serde_json::json!({
            "type": "bogo",
            "discount": {}
        });
        assert!(serde_json::from_value::<Coupon>(unknown).is_err());
    }

    #[test]
    fn test_policies_parse() {
        assert_eq!("Proportional".parse::<EgpDiscountPolicy>(), Ok(EgpDiscountPolicy::Proportional));
        assert_eq!("undiscounted".parse::<EgpDiscountPolicy>(), Ok(EgpDiscountPolicy::Undiscounted));
        assert!("half".parse::<EgpDiscountPolicy>().is_err());
        assert_eq!("zero".parse::<MissingPricePolicy>(), Ok(MissingPricePolicy::TreatAsZero));
        assert_eq!(" reject ".parse::<MissingPricePolicy>(), Ok(MissingPricePolicy::Reject));
    }

    #[test]
    fn test_coupon_expiry_check() {
        let coupon = Coupon {
            code: "X".to_string(),
            discount: Discount::Percent { percent: dec!(5) },
            expires_at: Some("2025-06-01T00:00:00Z".parse().unwrap()),
            active: true,
        };
        assert!(!coupon.is_expired_at("2025-05-31T23:59:59Z".parse().unwrap()));
        assert!(coupon.is_expired_at("2025-06-01T00:00:00Z".parse().unwrap()));
    }
}

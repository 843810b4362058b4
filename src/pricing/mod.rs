//! Pricing engine module for trip bookings.
//!
//! Computes booking subtotals, applies coupons and derives final totals.
//! The booking front end calls it via HTTP/JSON before creating a booking.

pub mod calculators;
pub mod models;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::round_money;
pub use models::{BookingQuote, Coupon, Discount, PartySize, PricingOptions, Trip};
pub use routes::router;
pub use services::{PricingEngine, PricingError};

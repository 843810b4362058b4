//! Booking-side models shared by routes and API clients

pub mod booking;

pub use booking::{BookingDraft, BookingPayload, Customer, PayloadAmount, PayloadCoupon};

//! Trip booking pricing service.
//!
//! Prices trips for a party, applies coupons, and assembles booking payloads
//! for the booking API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod pricing;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::api::{ApiClient, BookingService, ExchangeRates, TripCatalog};
use crate::cache::AppCache;
use crate::pricing::{PricingEngine, PricingOptions};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: PricingEngine,
    pub trips: Arc<dyn TripCatalog>,
    pub rates: Arc<dyn ExchangeRates>,
    pub bookings: Arc<dyn BookingService>,
    pub cache: AppCache,
}

impl AppState {
    /// State backed by a single booking API client
    pub fn new(client: Arc<ApiClient>, cache: AppCache, options: PricingOptions) -> Self {
        Self {
            engine: PricingEngine::new(client.clone(), options),
            trips: client.clone(),
            rates: client.clone(),
            bookings: client,
            cache,
        }
    }
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .merge(pricing::router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fakes::FakeApi;
    use crate::pricing::models::{CategoryPrice, Discount, PriceTable, Trip};
    use crate::pricing::Coupon;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn fake_api() -> Arc<FakeApi> {
        let trip = Trip {
            id: "trip-1".to_string(),
            name: "Luxor day trip".to_string(),
            prices: PriceTable {
                adult: CategoryPrice {
                    egp: Some(dec!(2600)),
                    euro: Some(dec!(50)),
                },
                child: CategoryPrice {
                    egp: Some(dec!(1040)),
                    euro: Some(dec!(20)),
                },
            },
        };
        let unpriced = Trip {
            id: "trip-unpriced".to_string(),
            name: "Draft trip".to_string(),
            prices: PriceTable::default(),
        };
        let coupon = Coupon {
            code: "NILE10".to_string(),
            discount: Discount::Percent { percent: dec!(10) },
            expires_at: None,
            active: true,
        };

        Arc::new(
            FakeApi::default()
                .with_trip(trip)
                .with_trip(unpriced)
                .with_coupon(coupon),
        )
    }

    fn test_app(api: Arc<FakeApi>) -> Router {
        let state = AppState {
            engine: PricingEngine::new(api.clone(), PricingOptions::default()),
            trips: api.clone(),
            rates: api.clone(),
            bookings: api,
            cache: AppCache::default(),
        };
        app(state)
    }

    async fn call(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(json) => Body::from(json.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Money fields are decimal strings; compare by value, not scale
    fn money(value: &Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(test_app(fake_api()), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_quote_route_with_coupon() {
        let (status, body) = call(
            test_app(fake_api()),
            Method::POST,
            "/api/pricing/quote",
            Some(json!({"trip_id": "trip-1", "adults": 2, "children": 1, "coupon_code": "NILE10"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["trip_name"], "Luxor day trip");
        assert_eq!(money(&body["subtotal"]["euro"]), dec!(120));
        assert_eq!(money(&body["discount"]["euro"]), dec!(12));
        assert_eq!(money(&body["total"]["euro"]), dec!(108));
        assert_eq!(money(&body["total"]["egp"]), dec!(5616));
        assert_eq!(body["applied_coupon"]["code"], "NILE10");
        assert!(body.get("coupon_error").is_none());
    }

    #[tokio::test]
    async fn test_quote_route_reports_bad_coupon_inline() {
        let (status, body) = call(
            test_app(fake_api()),
            Method::POST,
            "/api/pricing/quote",
            Some(json!({"trip_id": "trip-1", "adults": 1, "coupon_code": "BOGUS"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(money(&body["total"]["euro"]), dec!(50));
        assert_eq!(body["coupon_error"], "Invalid coupon code");
        assert_eq!(body["applied_coupon"], Value::Null);
    }

    #[tokio::test]
    async fn test_quote_route_refuses_missing_prices() {
        let (status, body) = call(
            test_app(fake_api()),
            Method::POST,
            "/api/pricing/quote",
            Some(json!({"trip_id": "trip-unpriced", "adults": 1})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error_type"], "missing_price_data");
        assert_eq!(body["details"]["field"], "prices.adult.euro");
    }

    #[tokio::test]
    async fn test_quote_route_rejects_zero_adults() {
        let (status, body) = call(
            test_app(fake_api()),
            Method::POST,
            "/api/pricing/quote",
            Some(json!({"trip_id": "trip-1", "adults": 0, "children": 2})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_type"], "invalid_input");
    }

    #[tokio::test]
    async fn test_quote_route_rejects_oversized_party() {
        let (status, body) = call(
            test_app(fake_api()),
            Method::POST,
            "/api/pricing/quote",
            Some(json!({"trip_id": "trip-1", "adults": 4294967295u32, "children": 1, "coupon_code": "NILE10"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_type"], "invalid_input");
    }

    #[tokio::test]
    async fn test_apply_coupon_route_handles_huge_base() {
        let (status, body) = call(
            test_app(fake_api()),
            Method::POST,
            "/api/pricing/coupons/apply",
            Some(json!({"base_total_euro": Decimal::MAX.to_string(), "coupon_code": "NILE10"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(money(&body["final_total_euro"]) < Decimal::MAX);
    }

    #[tokio::test]
    async fn test_subtotal_route_unknown_trip() {
        let (status, body) = call(
            test_app(fake_api()),
            Method::POST,
            "/api/pricing/subtotal",
            Some(json!({"trip_id": "nope", "adults": 1})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error_type"], "trip_not_found");
    }

    #[tokio::test]
    async fn test_subtotal_route() {
        let (status, body) = call(
            test_app(fake_api()),
            Method::POST,
            "/api/pricing/subtotal",
            Some(json!({"trip_id": "trip-1", "adults": 2, "children": 1})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(money(&body["subtotal"]["euro"]), dec!(120));
        assert_eq!(money(&body["subtotal"]["egp"]), dec!(6240));
        assert_eq!(body["egp_source"], "price_table");
    }

    #[tokio::test]
    async fn test_apply_coupon_route() {
        let app = test_app(fake_api());

        let (status, body) = call(
            app.clone(),
            Method::POST,
            "/api/pricing/coupons/apply",
            Some(json!({"base_total_euro": 120, "coupon_code": "NILE10", "ticket_count": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(money(&body["final_total_euro"]), dec!(108));
        assert_eq!(body["discount"]["kind"], "percent");

        let (status, body) = call(
            app,
            Method::POST,
            "/api/pricing/coupons/apply",
            Some(json!({"base_total_euro": "120", "coupon_code": "nile10"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error_type"], "invalid_coupon");
        assert_eq!(body["message"], "Invalid coupon code");
    }

    #[tokio::test]
    async fn test_validate_coupon_route() {
        let (status, body) = call(
            test_app(fake_api()),
            Method::GET,
            "/api/pricing/coupons/NILE10",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], "NILE10");
        assert_eq!(money(&body["discount"]["percent"]), dec!(10));
    }

    #[tokio::test]
    async fn test_create_booking_route_forwards_payload() {
        let api = fake_api();
        let draft = json!({
            "trip_id": "trip-1",
            "adults": 2,
            "children": 1,
            "coupon_code": "NILE10",
            "transportation": true,
            "user": {"name": "Mona Adel", "email": "mona@example.com", "phone": "+20100000000"},
            "payment": "cash",
            "booking_date": "2026-11-02"
        });

        let (status, body) = call(test_app(api.clone()), Method::POST, "/api/bookings", Some(draft)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["booking"]["_id"], "booking-1");
        assert_eq!(body["payload"]["totalPrice"]["euro"], 108.0);

        let bookings = api.bookings.lock().unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].coupon.as_ref().unwrap().code, "NILE10");
        assert!(bookings[0].transportation);
        assert!(!bookings[0].check_in);
    }

    #[tokio::test]
    async fn test_booking_payload_route_drops_bad_coupon() {
        let api = fake_api();
        let draft = json!({
            "trip_id": "trip-1",
            "adults": 1,
            "coupon_code": "EXPIRED",
            "user": {"name": "Omar", "email": "omar@example.com"},
            "payment": "card",
            "booking_date": "2026-12-24"
        });

        let (status, body) = call(
            test_app(api.clone()),
            Method::POST,
            "/api/pricing/booking-payload",
            Some(draft),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.get("coupon").is_none());
        assert_eq!(body["totalPrice"]["euro"], 50.0);
        assert!(api.bookings.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_booking_refuses_unpriced_trip() {
        let api = fake_api();
        let draft = json!({
            "trip_id": "trip-unpriced",
            "user": {"name": "Omar", "email": "omar@example.com"},
            "payment": "card",
            "booking_date": "2026-12-24"
        });

        let (status, _) = call(test_app(api.clone()), Method::POST, "/api/bookings", Some(draft)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(api.bookings.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_trip_route() {
        let (status, _) = call(
            test_app(fake_api()),
            Method::DELETE,
            "/api/cache/trips/trip-1",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_invalidate_all_route() {
        let (status, _) = call(test_app(fake_api()), Method::DELETE, "/api/cache", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}

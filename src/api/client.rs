//! reqwest client for the booking API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::models::BookingPayload;
use crate::pricing::models::{Coupon, Trip};

use super::types::{ApiError, ApplyCouponBody, Envelope, ExchangeRateData};
use super::{BookingService, CouponService, ExchangeRates, TripCatalog};

pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Transport(format!("invalid base url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Transport(format!(
                "base url '{}' cannot carry a path",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    /// Join path segments onto the base url, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => envelope.into_result(status),
            Err(e) if status.is_success() => Err(ApiError::Decode(e.to_string())),
            Err(_) => {
                // Non-success responses may carry a message without a decodable payload
                let fallback = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                    .ok()
                    .and_then(|env| env.message)
                    .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
                if status == reqwest::StatusCode::NOT_FOUND {
                    Err(ApiError::NotFound(fallback))
                } else {
                    Err(ApiError::Rejected(fallback))
                }
            }
        }
    }
}

#[async_trait]
impl TripCatalog for ApiClient {
    async fn fetch_trip(&self, trip_id: &str) -> Result<Trip, ApiError> {
        let url = self.endpoint(&["trips", trip_id]);
        debug!(url = %url, "Fetching trip");

        let response = self.client.get(url).send().await?;
        Self::read_envelope(response).await
    }
}

#[async_trait]
impl CouponService for ApiClient {
    async fn validate(&self, code: &str) -> Result<Coupon, ApiError> {
        let url = self.endpoint(&["coupons", code]);
        debug!(url = %url, "Validating coupon");

        let response = self.client.get(url).send().await?;
        Self::read_envelope(response).await
    }

    async fn apply(&self, code: &str, ticket_count: u32) -> Result<Coupon, ApiError> {
        let url = self.endpoint(&["coupons", "apply"]);
        debug!(url = %url, ticket_count, "Applying coupon");

        let response = self
            .client
            .post(url)
            .json(&ApplyCouponBody { code, ticket_count })
            .send()
            .await?;
        Self::read_envelope(response).await
    }
}

#[async_trait]
impl ExchangeRates for ApiClient {
    async fn eur_to_egp(&self) -> Result<Decimal, ApiError> {
        let url = self.endpoint(&["currency", "eur-egp"]);
        debug!(url = %url, "Fetching EUR->EGP rate");

        let response = self.client.get(url).send().await?;
        let data: ExchangeRateData = Self::read_envelope(response).await?;
        if data.rate <= Decimal::ZERO {
            return Err(ApiError::Decode(format!("non-positive exchange rate {}", data.rate)));
        }
        Ok(data.rate)
    }
}

#[async_trait]
impl BookingService for ApiClient {
    async fn create_booking(&self, payload: &BookingPayload) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(&["bookings"]);
        info!(url = %url, trip_id = %payload.trip_info, "Submitting booking");

        let response = self.client.post(url).json(payload).send().await?;
        Self::read_envelope(response).await
    }
}

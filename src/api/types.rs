//! Wire types for the booking API.

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Booking API error taxonomy as seen by this service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The API answered with a non-success payload
    #[error("{0}")]
    Rejected(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request to booking API timed out")]
    Timeout,

    #[error("booking API unreachable: {0}")]
    Transport(String),

    #[error("unexpected response from booking API: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Standard response envelope: `{status, data?, message?}`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, treating any non-"success" status as a rejection
    pub fn into_result(self, http_status: StatusCode) -> Result<T, ApiError> {
        if self.status == "success" && http_status.is_success() {
            return self
                .data
                .ok_or_else(|| ApiError::Decode("success response without data".to_string()));
        }

        let message = self
            .message
            .unwrap_or_else(|| format!("request failed with status {}", http_status.as_u16()));

        if http_status == StatusCode::NOT_FOUND {
            Err(ApiError::NotFound(message))
        } else {
            Err(ApiError::Rejected(message))
        }
    }
}

/// Body for coupon application with a ticket count
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponBody<'a> {
    pub code: &'a str,
    pub ticket_count: u32,
}

/// Payload of the EUR→EGP rate endpoint
#[derive(Debug, Deserialize)]
pub struct ExchangeRateData {
    pub rate: Decimal,
}

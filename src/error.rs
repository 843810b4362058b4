//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::ApiError;
use crate::pricing::responses::PricingErrorResponse;
use crate::pricing::PricingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Booking API error: {0}")]
    Upstream(#[from] ApiError),
}

impl AppError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Pricing(e) => match e {
                PricingError::InvalidCoupon { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "invalid_coupon")
                }
                PricingError::MissingPriceData { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "missing_price_data")
                }
                PricingError::Network(_) => (StatusCode::BAD_GATEWAY, "network_error"),
                PricingError::TripNotFound { .. } => (StatusCode::NOT_FOUND, "trip_not_found"),
                PricingError::TripUnavailable { .. } => {
                    (StatusCode::BAD_GATEWAY, "trip_unavailable")
                }
                PricingError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            },
            AppError::Upstream(ApiError::Rejected(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "booking_rejected")
            }
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        let message = match &self {
            AppError::Upstream(e) if status.is_server_error() => {
                tracing::error!("Booking API error: {}", e);
                self.to_string()
            }
            AppError::Pricing(e @ PricingError::MissingPriceData { .. }) => {
                tracing::error!("Refusing to price: {}", e);
                e.to_string()
            }
            AppError::Pricing(e) if status.is_server_error() => {
                tracing::warn!("Pricing collaborator failure: {}", e);
                e.to_string()
            }
            AppError::Pricing(e) => e.user_message(),
            AppError::Upstream(e) => e.to_string(),
        };

        let details = match &self {
            AppError::Pricing(PricingError::MissingPriceData { trip_id, field }) => {
                Some(serde_json::json!({ "trip_id": trip_id, "field": field }))
            }
            _ => None,
        };

        let body = PricingErrorResponse {
            error_type: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

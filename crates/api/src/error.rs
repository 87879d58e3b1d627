//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout pipeline error.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": msg }),
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": msg }),
            ),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": msg }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Shoppers see validation and persistence failures only; the orchestrator
/// has already absorbed everything else.
fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, serde_json::Value) {
    match &err {
        CheckoutError::Invalid(msg) => (
            StatusCode::BAD_REQUEST,
            serde_json::json!({ "error": msg }),
        ),
        CheckoutError::InsufficientStock { shortages } => (
            StatusCode::CONFLICT,
            serde_json::json!({
                "error": "Insufficient stock",
                "details": shortages,
            }),
        ),
        CheckoutError::Stock(_) | CheckoutError::Persistence(_) => {
            tracing::error!(error = %err, "checkout failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({
                    "error": "Checkout failed",
                    "details": err.to_string(),
                }),
            )
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<orders::OrderError> for ApiError {
    fn from(err: orders::OrderError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

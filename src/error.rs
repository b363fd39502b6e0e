//! Storefront error types with HTTP status code mapping.
//!
//! [`DepotError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Amount, OrderId, ProductId, TopUpId, TopUpStatus};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "insufficient funds: balance 50, required 100",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server / Store  | 500 / 503                    |
/// | 4000–4999 | Ledger          | 422 Unprocessable Entity     |
/// | 5000–5999 | Auth            | 401 / 403                    |
#[derive(Debug, thiserror::Error)]
pub enum DepotError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A balance computation would exceed the representable range.
    #[error("amount overflow")]
    AmountOverflow,

    /// Product with the given ID was not found.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// Order with the given ID was not found.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// Top-up request with the given ID was not found.
    #[error("top-up request not found: {0}")]
    TopUpNotFound(TopUpId),

    /// The top-up request was already approved or rejected.
    #[error("top-up request {id} already reviewed ({status})")]
    TopUpAlreadyReviewed {
        /// Request identifier.
        id: TopUpId,
        /// Status observed inside the transaction.
        status: TopUpStatus,
    },

    /// Wallet balance does not cover the order price.
    #[error("insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds {
        /// Balance at the time of the attempt.
        balance: Amount,
        /// Amount the operation needed.
        required: Amount,
    },

    /// Optimistic concurrency retries were exhausted.
    #[error("transaction aborted after {attempts} conflicting attempts")]
    TransactionConflict {
        /// Number of attempts made.
        attempts: u32,
    },

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Missing or invalid bearer token.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Caller lacks the administrator role.
    #[error("forbidden: administrator role required")]
    Forbidden,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DepotError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::AmountOverflow => 1002,
            Self::ProductNotFound(_) => 2001,
            Self::OrderNotFound(_) => 2002,
            Self::TopUpNotFound(_) => 2003,
            Self::TopUpAlreadyReviewed { .. } => 2101,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::TransactionConflict { .. } => 3002,
            Self::InsufficientFunds { .. } => 4001,
            Self::Unauthenticated(_) => 5001,
            Self::Forbidden => 5003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::AmountOverflow => StatusCode::BAD_REQUEST,
            Self::ProductNotFound(_) | Self::OrderNotFound(_) | Self::TopUpNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::TopUpAlreadyReviewed { .. } => StatusCode::CONFLICT,
            Self::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::TransactionConflict { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for DepotError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_is_unprocessable() {
        let err = DepotError::InsufficientFunds {
            balance: Amount::new(50),
            required: Amount::new(100),
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), 4001);
        assert_eq!(
            err.to_string(),
            "insufficient funds: balance 50, required 100"
        );
    }

    #[test]
    fn already_reviewed_is_conflict() {
        let err = DepotError::TopUpAlreadyReviewed {
            id: TopUpId::new(),
            status: TopUpStatus::Approved,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("Approved"));
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(
            DepotError::Unauthenticated("missing token".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(DepotError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn into_response_carries_code_and_status() {
        let response = DepotError::OrderNotFound(OrderId::new()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let Ok(json) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            panic!("body is not json");
        };
        assert_eq!(json["error"]["code"], 2002);
    }
}

//! System endpoints: health check and payment configuration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::config::PaymentAccount;
use crate::domain::Amount;
use crate::store::StoreStats;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    documents: StoreStats,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp and document counts.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            documents: state.store.stats().await,
        }),
    )
}

/// Payment rails accepted for top-ups.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentMethodsResponse {
    accounts: Vec<PaymentAccount>,
    min_top_up: Amount,
}

/// `GET /config/payment-methods` — Where to send money for a top-up.
#[utoipa::path(
    get,
    path = "/config/payment-methods",
    tag = "System",
    summary = "List payment methods",
    description = "Returns the merchant account for every accepted payment rail and the minimum top-up amount.",
    responses(
        (status = 200, description = "Payment configuration", body = PaymentMethodsResponse),
    )
)]
pub async fn payment_methods_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(PaymentMethodsResponse {
        accounts: state.payment_accounts.to_vec(),
        min_top_up: state.min_top_up,
    })
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/payment-methods", get(payment_methods_handler))
}

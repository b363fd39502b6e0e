//! Wallet handlers: balance and agreement.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::WalletResponse;
use crate::app_state::AppState;
use crate::auth::Authenticated;
use crate::error::{DepotError, ErrorResponse};

/// `GET /wallet` — The caller's wallet.
#[utoipa::path(
    get,
    path = "/api/v1/wallet",
    tag = "Wallet",
    summary = "Get wallet",
    description = "Returns the caller's balance. Users without a wallet have a zero balance.",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Wallet", body = WalletResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn get_wallet(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> impl IntoResponse {
    let wallet = state.ledger.wallet(&caller).await;
    Json(WalletResponse::new(caller.user_id, wallet))
}

/// `POST /wallet/agreement` — Accept the storefront agreement.
///
/// # Errors
///
/// Returns [`DepotError::TransactionConflict`] if the store stays contended.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/agreement",
    tag = "Wallet",
    summary = "Accept agreement",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Agreement recorded", body = WalletResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn accept_agreement(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> Result<impl IntoResponse, DepotError> {
    let wallet = state.ledger.accept_agreement(&caller).await?;
    Ok(Json(WalletResponse::new(caller.user_id, wallet)))
}

/// Wallet routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wallet", get(get_wallet))
        .route("/wallet/agreement", post(accept_agreement))
}

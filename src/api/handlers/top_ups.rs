//! Top-up handlers: submit and list own requests.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{PaginationParams, SubmitTopUpRequest, TopUpListResponse};
use crate::app_state::AppState;
use crate::auth::Authenticated;
use crate::domain::TopUpRequest;
use crate::error::{DepotError, ErrorResponse};

/// `POST /top-ups` — Claim a payment for manual verification.
///
/// # Errors
///
/// Returns [`DepotError::InvalidRequest`] for an amount below the minimum or
/// a short transaction reference.
#[utoipa::path(
    post,
    path = "/api/v1/top-ups",
    tag = "Top-ups",
    summary = "Submit top-up",
    description = "Records a pending top-up request. The wallet is credited only after an administrator approves it.",
    request_body = SubmitTopUpRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Request recorded", body = TopUpRequest),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn submit_top_up(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Json(req): Json<SubmitTopUpRequest>,
) -> Result<impl IntoResponse, DepotError> {
    let top_up = state
        .ledger
        .submit_top_up(&caller, req.amount, req.payment_method, &req.transaction_ref)
        .await?;
    Ok((StatusCode::CREATED, Json(top_up)))
}

/// `GET /top-ups` — The caller's top-up requests.
#[utoipa::path(
    get,
    path = "/api/v1/top-ups",
    tag = "Top-ups",
    summary = "List own top-ups",
    params(PaginationParams),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Requests, newest first", body = TopUpListResponse),
    )
)]
pub async fn list_top_ups(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let top_ups = state.ledger.top_ups_for(&caller, usize::MAX).await;
    let (data, pagination) = params.paginate(top_ups);
    Json(TopUpListResponse { data, pagination })
}

/// Top-up routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/top-ups", get(list_top_ups).post(submit_top_up))
}

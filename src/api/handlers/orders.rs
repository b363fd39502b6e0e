//! Order handlers: place, list own orders, public tracking by player id.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{OrderListResponse, PaginationParams, PlaceOrderRequest};
use crate::app_state::AppState;
use crate::auth::Authenticated;
use crate::domain::Order;
use crate::error::{DepotError, ErrorResponse};

/// `POST /orders` — Buy a product with wallet balance.
///
/// # Errors
///
/// Returns [`DepotError`] on invalid input, an unknown product or
/// insufficient funds.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "Orders",
    summary = "Place order",
    description = "Debits the product price from the caller's wallet and creates a pending order, atomically.",
    request_body = PlaceOrderRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Invalid player id", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 422, description = "Insufficient funds", body = ErrorResponse),
    )
)]
pub async fn place_order(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, DepotError> {
    let order = state
        .ledger
        .place_order(&caller, req.product_id, &req.player_id)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /orders` — The caller's orders.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "Orders",
    summary = "List own orders",
    params(PaginationParams),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Orders, newest first", body = OrderListResponse),
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let orders = state.ledger.orders_for(&caller, usize::MAX).await;
    let (data, pagination) = params.paginate(orders);
    Json(OrderListResponse { data, pagination })
}

/// `GET /orders/player/{player_id}` — Track orders by game player id.
///
/// # Errors
///
/// Returns [`DepotError::InvalidRequest`] for a blank player id.
#[utoipa::path(
    get,
    path = "/api/v1/orders/player/{player_id}",
    tag = "Orders",
    summary = "Track orders",
    description = "Public lookup of every order delivered to a game player id.",
    params(("player_id" = String, Path, description = "Game player id")),
    responses(
        (status = 200, description = "Orders, newest first", body = Vec<Order>),
    )
)]
pub async fn orders_for_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<impl IntoResponse, DepotError> {
    Ok(Json(state.ledger.orders_for_player(&player_id).await?))
}

/// Order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(place_order))
        .route("/orders/player/{player_id}", get(orders_for_player))
}

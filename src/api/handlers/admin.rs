//! Administrator handlers: order and top-up review, balance overrides,
//! customer listing and revenue.
//!
//! Every handler passes the caller to a service method that rejects
//! non-admin identities with `403`.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{
    AdminOrderListResponse, AdminOrderQuery, AdminTopUpQuery, BalanceOverrideResponse,
    CustomerListResponse, CustomerQuery, EditBalanceRequest, ReviewTopUpRequest,
    TopUpListResponse, UpdateOrderStatusRequest,
};
use crate::app_state::AppState;
use crate::auth::Authenticated;
use crate::domain::{Order, OrderId, OrderStatusCounts, RevenueReport, TopUpId, TopUpRequest, UserId};
use crate::error::{DepotError, ErrorResponse};

/// `GET /admin/orders` — Every order, optionally filtered by status.
///
/// # Errors
///
/// Returns [`DepotError::Forbidden`] for non-admin callers.
#[utoipa::path(
    get,
    path = "/api/v1/admin/orders",
    tag = "Admin",
    summary = "List all orders",
    params(AdminOrderQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Orders with status totals", body = AdminOrderListResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Query(query): Query<AdminOrderQuery>,
) -> Result<impl IntoResponse, DepotError> {
    let orders = state.ledger.all_orders(&caller).await?;
    let counts = OrderStatusCounts::tally(&orders);
    let filtered: Vec<Order> = match query.status {
        Some(status) => orders.into_iter().filter(|o| o.status == status).collect(),
        None => orders,
    };
    let (data, pagination) = query.pagination().paginate(filtered);
    Ok(Json(AdminOrderListResponse {
        data,
        pagination,
        counts,
    }))
}

/// `PUT /admin/orders/{id}/status` — Change an order's status.
///
/// # Errors
///
/// Returns [`DepotError`] for non-admin callers or an unknown order.
#[utoipa::path(
    put,
    path = "/api/v1/admin/orders/{id}/status",
    tag = "Admin",
    summary = "Update order status",
    description = "Sets the status. The first transition into `Failed` refunds the order price to the buyer's wallet in the same transaction.",
    params(("id" = String, Path, description = "Order UUID")),
    request_body = UpdateOrderStatusRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Order after the change", body = Order),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, DepotError> {
    Ok(Json(state.ledger.review_order(&caller, id, req.status).await?))
}

/// `GET /admin/top-ups` — Every top-up request.
///
/// # Errors
///
/// Returns [`DepotError::Forbidden`] for non-admin callers.
#[utoipa::path(
    get,
    path = "/api/v1/admin/top-ups",
    tag = "Admin",
    summary = "List all top-ups",
    params(AdminTopUpQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Requests, newest first", body = TopUpListResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
    )
)]
pub async fn list_top_ups(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Query(query): Query<AdminTopUpQuery>,
) -> Result<impl IntoResponse, DepotError> {
    let top_ups = state.ledger.all_top_ups(&caller).await?;
    let filtered: Vec<TopUpRequest> = match query.status {
        Some(status) => top_ups.into_iter().filter(|t| t.status == status).collect(),
        None => top_ups,
    };
    let (data, pagination) = query.pagination().paginate(filtered);
    Ok(Json(TopUpListResponse { data, pagination }))
}

/// `POST /admin/top-ups/{id}/review` — Approve or reject a request.
///
/// # Errors
///
/// Returns [`DepotError`] for non-admin callers, an unknown request or one
/// that was already reviewed.
#[utoipa::path(
    post,
    path = "/api/v1/admin/top-ups/{id}/review",
    tag = "Admin",
    summary = "Review top-up",
    description = "Approval credits the requester's wallet in the same transaction. A request can be reviewed once.",
    params(("id" = String, Path, description = "Top-up request UUID")),
    request_body = ReviewTopUpRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Request after review", body = TopUpRequest),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Already reviewed", body = ErrorResponse),
    )
)]
pub async fn review_top_up(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<TopUpId>,
    Json(req): Json<ReviewTopUpRequest>,
) -> Result<impl IntoResponse, DepotError> {
    Ok(Json(state.ledger.review_top_up(&caller, id, req.decision).await?))
}

/// `GET /admin/customers` — Customer table.
///
/// # Errors
///
/// Returns [`DepotError::Forbidden`] for non-admin callers.
#[utoipa::path(
    get,
    path = "/api/v1/admin/customers",
    tag = "Admin",
    summary = "List customers",
    params(CustomerQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Customers", body = CustomerListResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
    )
)]
pub async fn list_customers(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Query(query): Query<CustomerQuery>,
) -> Result<impl IntoResponse, DepotError> {
    let data = state
        .reports
        .customers(&caller, query.search.as_deref())
        .await?;
    Ok(Json(CustomerListResponse {
        total: data.len(),
        data,
    }))
}

/// `PUT /admin/customers/{id}/balance` — Overwrite a wallet balance.
///
/// # Errors
///
/// Returns [`DepotError::Forbidden`] for non-admin callers.
#[utoipa::path(
    put,
    path = "/api/v1/admin/customers/{id}/balance",
    tag = "Admin",
    summary = "Override balance",
    params(("id" = String, Path, description = "User id")),
    request_body = EditBalanceRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Balance replaced", body = BalanceOverrideResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
    )
)]
pub async fn edit_balance(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(user_id): Path<UserId>,
    Json(req): Json<EditBalanceRequest>,
) -> Result<impl IntoResponse, DepotError> {
    let previous_balance = state
        .ledger
        .edit_balance(&caller, &user_id, req.balance)
        .await?;
    Ok(Json(BalanceOverrideResponse {
        user_id,
        previous_balance,
        balance: req.balance,
    }))
}

/// `GET /admin/revenue` — Revenue from completed orders.
///
/// # Errors
///
/// Returns [`DepotError::Forbidden`] for non-admin callers.
#[utoipa::path(
    get,
    path = "/api/v1/admin/revenue",
    tag = "Admin",
    summary = "Revenue report",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Revenue totals and seven-day chart", body = RevenueReport),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
    )
)]
pub async fn revenue(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> Result<impl IntoResponse, DepotError> {
    Ok(Json(state.reports.revenue(&caller).await?))
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/orders", get(list_orders))
        .route("/admin/orders/{id}/status", put(update_order_status))
        .route("/admin/top-ups", get(list_top_ups))
        .route("/admin/top-ups/{id}/review", post(review_top_up))
        .route("/admin/customers", get(list_customers))
        .route("/admin/customers/{id}/balance", put(edit_balance))
        .route("/admin/revenue", get(revenue))
}

//! Order DTOs for placement, listing and status review.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, PaginationParams, default_page, default_per_page};
use crate::domain::{Order, OrderStatus, OrderStatusCounts, ProductId};

/// Request body for `POST /orders`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    /// Product to buy.
    pub product_id: ProductId,
    /// In-game player id that receives the diamonds.
    pub player_id: String,
}

/// Paginated order list.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderListResponse {
    /// Orders on this page, newest first.
    pub data: Vec<Order>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Paginated order list with per-status totals, for administrators.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOrderListResponse {
    /// Orders on this page, newest first.
    pub data: Vec<Order>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
    /// Totals over all orders, ignoring the status filter.
    pub counts: OrderStatusCounts,
}

/// Query parameters for `GET /admin/orders`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminOrderQuery {
    /// Only return orders in this status.
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100).
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl AdminOrderQuery {
    /// Pagination part of the query.
    #[must_use]
    pub const fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Request body for `PUT /admin/orders/{id}/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// New status.
    pub status: OrderStatus,
}

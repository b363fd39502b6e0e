//! Top-up DTOs for submission, listing and review.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, PaginationParams, default_page, default_per_page};
use crate::domain::{Amount, PaymentMethod, ReviewDecision, TopUpRequest, TopUpStatus};

/// Request body for `POST /top-ups`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitTopUpRequest {
    /// Amount sent, in currency subunits.
    pub amount: Amount,
    /// Rail the money was sent through.
    pub payment_method: PaymentMethod,
    /// Transaction id shown by the payment app.
    pub transaction_ref: String,
}

/// Paginated top-up list.
#[derive(Debug, Serialize, ToSchema)]
pub struct TopUpListResponse {
    /// Requests on this page, newest first.
    pub data: Vec<TopUpRequest>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Query parameters for `GET /admin/top-ups`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminTopUpQuery {
    /// Only return requests in this status.
    #[serde(default)]
    pub status: Option<TopUpStatus>,
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100).
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl AdminTopUpQuery {
    /// Pagination part of the query.
    #[must_use]
    pub const fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Request body for `POST /admin/top-ups/{id}/review`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewTopUpRequest {
    /// Approve or reject.
    pub decision: ReviewDecision,
}

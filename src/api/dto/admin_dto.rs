//! Admin-only DTOs: balance overrides and customer listings.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Amount, CustomerSummary, UserId};

/// Request body for `PUT /admin/customers/{id}/balance`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EditBalanceRequest {
    /// New balance in currency subunits.
    pub balance: Amount,
}

/// Response body for a balance override.
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceOverrideResponse {
    /// Wallet owner.
    pub user_id: UserId,
    /// Balance before the override.
    pub previous_balance: Amount,
    /// Balance after the override.
    pub balance: Amount,
}

/// Query parameters for `GET /admin/customers`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerQuery {
    /// Case-insensitive email substring.
    #[serde(default)]
    pub search: Option<String>,
}

/// Response body for `GET /admin/customers`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerListResponse {
    /// One row per customer.
    pub data: Vec<CustomerSummary>,
    /// Number of rows.
    pub total: usize,
}

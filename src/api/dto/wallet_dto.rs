//! Wallet DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Amount, UserId, Wallet};

/// Response body for `GET /wallet`.
#[derive(Debug, Serialize, ToSchema)]
pub struct WalletResponse {
    /// Wallet owner.
    pub user_id: UserId,
    /// Spendable balance in currency subunits.
    pub balance: Amount,
    /// Whether the storefront agreement was accepted.
    pub has_accepted_agreement: bool,
}

impl WalletResponse {
    /// Builds the response for `user_id`'s wallet.
    #[must_use]
    pub fn new(user_id: UserId, wallet: Wallet) -> Self {
        Self {
            user_id,
            balance: wallet.balance,
            has_accepted_agreement: wallet.has_accepted_agreement,
        }
    }
}

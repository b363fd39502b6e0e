//! Purchase orders paid from the wallet.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Amount, Identity, OrderId, Product, ProductId, UserId};

/// Delivery status of an order.
///
/// `Pending` is the initial state; `Completed` and `Failed` are terminal
/// from the user's perspective. Entering `Failed` pays a refund once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    /// Paid, awaiting delivery.
    Pending,
    /// Diamonds delivered.
    Completed,
    /// Delivery failed; the price is returned to the wallet.
    Failed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        };
        f.write_str(s)
    }
}

/// An order record.
///
/// `product_name` and `product_price` are snapshots taken at placement and
/// never follow later catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    /// Order identifier.
    pub id: OrderId,
    /// Purchasing user.
    pub user_id: UserId,
    /// Purchasing user's email at placement time.
    pub user_email: String,
    /// Destination game account (opaque, unverified).
    pub player_id: String,
    /// Catalog product the order was placed for.
    pub product_id: ProductId,
    /// Product name snapshot.
    pub product_name: String,
    /// Product price snapshot; the amount debited.
    pub product_price: Amount,
    /// Current status.
    pub status: OrderStatus,
    /// Whether the failure refund has been credited.
    #[serde(default)]
    pub refunded: bool,
    /// Placement timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last status change.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds a `Pending` order for `product`, snapshotting its name and
    /// price.
    #[must_use]
    pub fn place(buyer: &Identity, product: &Product, player_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: OrderId::new(),
            user_id: buyer.user_id.clone(),
            user_email: buyer.email.clone(),
            player_id: player_id.to_string(),
            product_id: product.id,
            product_name: product.name.clone(),
            product_price: product.price,
            status: OrderStatus::Pending,
            refunded: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` if moving to `next` must credit the price back.
    ///
    /// Only the first entry into `Failed` refunds; an order that was already
    /// refunded never refunds again, whatever path its status takes.
    #[must_use]
    pub fn refund_due(&self, next: OrderStatus) -> bool {
        next == OrderStatus::Failed && self.status != OrderStatus::Failed && !self.refunded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Game;

    fn sample_order() -> Order {
        let product = Product {
            id: ProductId::new(),
            name: "100 Diamonds".to_string(),
            price: Amount::new(50),
            game: Game::FreeFire,
        };
        let buyer = Identity::customer("u1", "u1@example.com");
        Order::place(&buyer, &product, "123456789", Utc::now())
    }

    #[test]
    fn placed_order_snapshots_product() {
        let order = sample_order();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.product_name, "100 Diamonds");
        assert_eq!(order.product_price, Amount::new(50));
        assert_eq!(order.user_email, "u1@example.com");
        assert!(!order.refunded);
    }

    #[test]
    fn first_failure_is_refunded() {
        let order = sample_order();
        assert!(order.refund_due(OrderStatus::Failed));
        assert!(!order.refund_due(OrderStatus::Completed));
        assert!(!order.refund_due(OrderStatus::Pending));
    }

    #[test]
    fn already_failed_is_not_refunded_again() {
        let mut order = sample_order();
        order.status = OrderStatus::Failed;
        order.refunded = true;
        assert!(!order.refund_due(OrderStatus::Failed));
    }

    #[test]
    fn refunded_order_reopened_is_not_refunded_again() {
        let mut order = sample_order();
        order.status = OrderStatus::Pending;
        order.refunded = true;
        assert!(!order.refund_due(OrderStatus::Failed));
    }
}

//! Domain events reflecting committed store mutations.
//!
//! Every committed change emits a [`DepotEvent`] through the
//! [`super::EventBus`]. Events drive live feed subscriptions, admin
//! WebSocket streams and the optional PostgreSQL mirror.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Amount, Order, OrderStatus, Product, ProductId, PromoBanner, TopUpRequest, UserId};

/// Domain event emitted after every committed mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum DepotEvent {
    /// An order was placed and its price debited.
    OrderPlaced {
        /// The new order.
        order: Order,
        /// Wallet balance after the debit.
        balance_after: Amount,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An admin changed an order's status.
    OrderStatusChanged {
        /// Order after the change.
        order: Order,
        /// Status before the change.
        previous_status: OrderStatus,
        /// Amount credited back, if this change paid the refund.
        refunded: Option<Amount>,
        /// Wallet balance after the refund, if one was paid.
        balance_after: Option<Amount>,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A user submitted a top-up request.
    TopUpSubmitted {
        /// The new request.
        top_up: TopUpRequest,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An admin approved or rejected a top-up request.
    TopUpReviewed {
        /// Request after review.
        top_up: TopUpRequest,
        /// Wallet balance after the credit, for approvals.
        balance_after: Option<Amount>,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An admin overwrote a wallet balance.
    BalanceOverridden {
        /// Wallet owner.
        user_id: UserId,
        /// Balance before the override.
        previous_balance: Amount,
        /// Balance after the override.
        new_balance: Amount,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A user accepted the storefront agreement.
    AgreementAccepted {
        /// Wallet owner.
        user_id: UserId,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A catalog product was created or updated.
    ProductUpserted {
        /// Product after the change.
        product: Product,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A catalog product was deleted.
    ProductRemoved {
        /// Deleted product.
        product_id: ProductId,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The promo banner was replaced.
    BannerUpdated {
        /// New banner.
        banner: PromoBanner,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl DepotEvent {
    /// Returns the user whose data this event concerns, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::OrderPlaced { order, .. } | Self::OrderStatusChanged { order, .. } => {
                Some(&order.user_id)
            }
            Self::TopUpSubmitted { top_up, .. } | Self::TopUpReviewed { top_up, .. } => {
                Some(&top_up.user_id)
            }
            Self::BalanceOverridden { user_id, .. } | Self::AgreementAccepted { user_id, .. } => {
                Some(user_id)
            }
            Self::ProductUpserted { .. } | Self::ProductRemoved { .. } | Self::BannerUpdated { .. } => {
                None
            }
        }
    }

    /// Returns `true` if the event changes a user's transaction feed.
    #[must_use]
    pub const fn affects_feed(&self) -> bool {
        matches!(
            self,
            Self::OrderPlaced { .. }
                | Self::OrderStatusChanged { .. }
                | Self::TopUpSubmitted { .. }
                | Self::TopUpReviewed { .. }
        )
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::OrderPlaced { .. } => "order_placed",
            Self::OrderStatusChanged { .. } => "order_status_changed",
            Self::TopUpSubmitted { .. } => "top_up_submitted",
            Self::TopUpReviewed { .. } => "top_up_reviewed",
            Self::BalanceOverridden { .. } => "balance_overridden",
            Self::AgreementAccepted { .. } => "agreement_accepted",
            Self::ProductUpserted { .. } => "product_upserted",
            Self::ProductRemoved { .. } => "product_removed",
            Self::BannerUpdated { .. } => "banner_updated",
        }
    }
}

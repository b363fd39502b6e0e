//! Addresses of individual documents across collections.

use std::fmt;

use crate::domain::{OrderId, ProductId, TopUpId, UserId};
use crate::error::DepotError;

/// Collection holding wallets, keyed by user id.
pub const WALLETS: &str = "wallets";
/// Collection holding orders.
pub const ORDERS: &str = "orders";
/// Collection holding top-up requests.
pub const TOP_UPS: &str = "topUpRequests";
/// Collection holding catalog products.
pub const PRODUCTS: &str = "products";
/// Collection holding singleton settings documents.
pub const SETTINGS: &str = "settings";
/// Document id of the promo banner inside [`SETTINGS`].
pub const BANNER_DOC_ID: &str = "promoBanner";

/// Identifies one document: its collection plus its id.
///
/// Transactions record read versions per key and the persistence mirror
/// upserts rows per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocKey {
    /// `wallets/{user_id}`.
    Wallet(UserId),
    /// `orders/{order_id}`.
    Order(OrderId),
    /// `topUpRequests/{top_up_id}`.
    TopUp(TopUpId),
    /// `products/{product_id}`.
    Product(ProductId),
    /// `settings/promoBanner`.
    Banner,
}

impl DocKey {
    /// Collection name of the document.
    #[must_use]
    pub const fn collection(&self) -> &'static str {
        match self {
            Self::Wallet(_) => WALLETS,
            Self::Order(_) => ORDERS,
            Self::TopUp(_) => TOP_UPS,
            Self::Product(_) => PRODUCTS,
            Self::Banner => SETTINGS,
        }
    }

    /// Document id within its collection.
    #[must_use]
    pub fn doc_id(&self) -> String {
        match self {
            Self::Wallet(id) => id.to_string(),
            Self::Order(id) => id.to_string(),
            Self::TopUp(id) => id.to_string(),
            Self::Product(id) => id.to_string(),
            Self::Banner => BANNER_DOC_ID.to_string(),
        }
    }

    /// Rebuilds a key from its stored collection and id.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::PersistenceError`] for an unknown collection,
    /// an unknown settings document or a malformed UUID.
    pub fn parse(collection: &str, doc_id: &str) -> Result<Self, DepotError> {
        let bad_id = |e: uuid::Error| {
            DepotError::PersistenceError(format!("invalid id {collection}/{doc_id}: {e}"))
        };
        match collection {
            WALLETS => Ok(Self::Wallet(UserId::new(doc_id))),
            ORDERS => doc_id.parse().map(Self::Order).map_err(bad_id),
            TOP_UPS => doc_id.parse().map(Self::TopUp).map_err(bad_id),
            PRODUCTS => doc_id.parse().map(Self::Product).map_err(bad_id),
            SETTINGS if doc_id == BANNER_DOC_ID => Ok(Self::Banner),
            _ => Err(DepotError::PersistenceError(format!(
                "unknown document {collection}/{doc_id}"
            ))),
        }
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection(), self.doc_id())
    }
}

//! Domain layer: storefront records, ledger value types and the event system.
//!
//! This module holds the document types kept in the store (wallets, orders,
//! top-up requests, products, the promo banner), the caller identity, the
//! event bus that broadcasts committed mutations, and the pure feed merge
//! and reporting functions computed over store snapshots.

pub mod amount;
pub mod banner;
pub mod depot_event;
pub mod event_bus;
pub mod feed;
pub mod identity;
pub mod ids;
pub mod order;
pub mod product;
pub mod report;
pub mod top_up;
pub mod wallet;

pub use amount::Amount;
pub use banner::{BannerVariant, PromoBanner};
pub use depot_event::DepotEvent;
pub use event_bus::EventBus;
pub use feed::{FeedEntry, FeedKind};
pub use identity::{Identity, Role};
pub use ids::{OrderId, ProductId, TopUpId, UserId};
pub use order::{Order, OrderStatus};
pub use product::{Game, Product, ProductDraft};
pub use report::{CustomerSummary, DailyRevenue, OrderStatusCounts, RevenueReport};
pub use top_up::{PaymentMethod, ReviewDecision, TopUpRequest, TopUpStatus};
pub use wallet::Wallet;

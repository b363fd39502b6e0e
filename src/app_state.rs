//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::{PaymentAccount, StorefrontConfig};
use crate::domain::EventBus;
use crate::service::{CatalogService, FeedService, LedgerService, ReportService, SettingsService};
use crate::store::DocumentStore;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Document store, exposed for health reporting.
    pub store: Arc<DocumentStore>,
    /// Wallet ledger operations.
    pub ledger: Arc<LedgerService>,
    /// Product catalog.
    pub catalog: Arc<CatalogService>,
    /// Merged transaction feeds.
    pub feed: Arc<FeedService>,
    /// Admin analytics.
    pub reports: Arc<ReportService>,
    /// Promo banner.
    pub settings: Arc<SettingsService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Bearer-token verifier.
    pub auth: TokenVerifier,
    /// Merchant accounts listed by the payment-methods endpoint.
    pub payment_accounts: Arc<[PaymentAccount]>,
    /// Smallest accepted top-up, listed alongside the accounts.
    pub min_top_up: crate::domain::Amount,
}

impl AppState {
    /// Wires every service around one shared store and event bus.
    #[must_use]
    pub fn new(store: Arc<DocumentStore>, event_bus: EventBus, config: &StorefrontConfig) -> Self {
        Self {
            ledger: Arc::new(LedgerService::new(
                Arc::clone(&store),
                event_bus.clone(),
                config.ledger_policy(),
            )),
            catalog: Arc::new(CatalogService::new(Arc::clone(&store), event_bus.clone())),
            feed: Arc::new(FeedService::new(
                Arc::clone(&store),
                event_bus.clone(),
                config.feed_stream_limit,
            )),
            reports: Arc::new(ReportService::new(Arc::clone(&store))),
            settings: Arc::new(SettingsService::new(Arc::clone(&store), event_bus.clone())),
            auth: TokenVerifier::new(config.auth_jwt_secret.as_bytes()),
            payment_accounts: config.payment_accounts.clone().into(),
            min_top_up: config.ledger_policy().min_top_up,
            store,
            event_bus,
        }
    }
}

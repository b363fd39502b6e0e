//! Service layer: business logic orchestration.
//!
//! [`LedgerService`] owns every wallet mutation and runs each one as an
//! atomic store transaction. The remaining services cover the catalog,
//! feeds, admin reports and sitewide settings. All of them emit events
//! through the [`super::domain::EventBus`] after a successful commit.

pub mod catalog_service;
pub mod feed_service;
pub mod ledger_service;
pub mod report_service;
pub mod settings_service;

pub use catalog_service::CatalogService;
pub use feed_service::{FeedService, FeedSubscription};
pub use ledger_service::{LedgerPolicy, LedgerService};
pub use report_service::ReportService;
pub use settings_service::SettingsService;

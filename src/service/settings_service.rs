//! Sitewide settings (the promo banner).

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{DepotEvent, EventBus, Identity, PromoBanner};
use crate::error::DepotError;
use crate::store::DocumentStore;

/// Reads and replaces the promo banner.
#[derive(Debug, Clone)]
pub struct SettingsService {
    store: Arc<DocumentStore>,
    event_bus: EventBus,
}

impl SettingsService {
    /// Creates a new `SettingsService`.
    #[must_use]
    pub fn new(store: Arc<DocumentStore>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Returns the current banner; disabled and empty if never set.
    pub async fn banner(&self) -> PromoBanner {
        self.store.banner().await
    }

    /// Replaces the banner.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::Forbidden`] if the caller is not an
    /// administrator, or [`DepotError::InvalidRequest`] if an enabled banner
    /// has no text.
    pub async fn set_banner(
        &self,
        admin: &Identity,
        banner: PromoBanner,
    ) -> Result<PromoBanner, DepotError> {
        admin.require_admin()?;
        let banner = PromoBanner {
            text: banner.text.trim().to_string(),
            ..banner
        };
        if banner.enabled && banner.text.is_empty() {
            return Err(DepotError::InvalidRequest(
                "an enabled banner needs text".to_string(),
            ));
        }

        self.store
            .run_transaction(|tx| {
                tx.put_banner(banner.clone());
                Ok(())
            })
            .await?;

        tracing::info!(enabled = banner.enabled, variant = ?banner.variant, "promo banner updated");
        let _ = self.event_bus.publish(DepotEvent::BannerUpdated {
            banner: banner.clone(),
            timestamp: Utc::now(),
        });
        Ok(banner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BannerVariant;

    fn service() -> SettingsService {
        SettingsService::new(Arc::new(DocumentStore::new(5)), EventBus::new(4))
    }

    #[tokio::test]
    async fn default_banner_is_disabled() {
        let banner = service().banner().await;
        assert!(!banner.enabled);
        assert!(banner.text.is_empty());
    }

    #[tokio::test]
    async fn admin_replaces_banner() {
        let svc = service();
        let banner = PromoBanner {
            enabled: true,
            text: "  Double diamonds this weekend ".to_string(),
            variant: BannerVariant::Info,
        };
        let admin = Identity::admin("a", "a@example.com");
        assert!(svc.set_banner(&admin, banner).await.is_ok());

        let stored = svc.banner().await;
        assert_eq!(stored.text, "Double diamonds this weekend");
        assert_eq!(stored.variant, BannerVariant::Info);
    }

    #[tokio::test]
    async fn enabled_banner_needs_text() {
        let svc = service();
        let admin = Identity::admin("a", "a@example.com");
        let banner = PromoBanner {
            enabled: true,
            ..PromoBanner::default()
        };
        assert!(matches!(
            svc.set_banner(&admin, banner).await,
            Err(DepotError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn customers_cannot_change_banner() {
        let svc = service();
        let customer = Identity::customer("c", "c@example.com");
        assert!(matches!(
            svc.set_banner(&customer, PromoBanner::default()).await,
            Err(DepotError::Forbidden)
        ));
    }
}

//! Product catalog management.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{DepotEvent, EventBus, Identity, Product, ProductDraft, ProductId};
use crate::error::DepotError;
use crate::store::DocumentStore;

/// Lists products publicly and lets administrators edit the catalog.
///
/// Orders snapshot product name and price when placed, so catalog edits
/// never reach existing orders.
#[derive(Debug, Clone)]
pub struct CatalogService {
    store: Arc<DocumentStore>,
    event_bus: EventBus,
}

impl CatalogService {
    /// Creates a new `CatalogService`.
    #[must_use]
    pub fn new(store: Arc<DocumentStore>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Returns the catalog ordered by ascending price.
    pub async fn list(&self) -> Vec<Product> {
        self.store.products().await
    }

    /// Returns one product.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::ProductNotFound`] if it does not exist.
    pub async fn get(&self, id: ProductId) -> Result<Product, DepotError> {
        self.store
            .product(id)
            .await
            .ok_or(DepotError::ProductNotFound(id))
    }

    /// Adds a product.
    ///
    /// # Errors
    ///
    /// - [`DepotError::Forbidden`] if the caller is not an administrator.
    /// - [`DepotError::InvalidRequest`] if the draft fails validation.
    pub async fn create(&self, admin: &Identity, draft: ProductDraft) -> Result<Product, DepotError> {
        admin.require_admin()?;
        let product = draft.validated()?.into_product(ProductId::new());

        self.store
            .run_transaction(|tx| {
                tx.put_product(product.clone());
                Ok(())
            })
            .await?;

        tracing::info!(product_id = %product.id, name = %product.name, price = %product.price, "product created");
        self.publish_upsert(&product);
        Ok(product)
    }

    /// Replaces a product's name, price and game.
    ///
    /// # Errors
    ///
    /// - [`DepotError::Forbidden`] if the caller is not an administrator.
    /// - [`DepotError::InvalidRequest`] if the draft fails validation.
    /// - [`DepotError::ProductNotFound`] if the product does not exist.
    pub async fn update(
        &self,
        admin: &Identity,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, DepotError> {
        admin.require_admin()?;
        let draft = draft.validated()?;

        let product = self
            .store
            .run_transaction(|tx| {
                if tx.product(id).is_none() {
                    return Err(DepotError::ProductNotFound(id));
                }
                let product = draft.clone().into_product(id);
                tx.put_product(product.clone());
                Ok(product)
            })
            .await?;

        tracing::info!(product_id = %id, price = %product.price, "product updated");
        self.publish_upsert(&product);
        Ok(product)
    }

    /// Removes a product from the catalog.
    ///
    /// # Errors
    ///
    /// - [`DepotError::Forbidden`] if the caller is not an administrator.
    /// - [`DepotError::ProductNotFound`] if the product does not exist.
    pub async fn delete(&self, admin: &Identity, id: ProductId) -> Result<(), DepotError> {
        admin.require_admin()?;

        self.store
            .run_transaction(|tx| {
                if tx.product(id).is_none() {
                    return Err(DepotError::ProductNotFound(id));
                }
                tx.delete_product(id);
                Ok(())
            })
            .await?;

        tracing::info!(product_id = %id, "product deleted");
        let _ = self.event_bus.publish(DepotEvent::ProductRemoved {
            product_id: id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    fn publish_upsert(&self, product: &Product) {
        let _ = self.event_bus.publish(DepotEvent::ProductUpserted {
            product: product.clone(),
            timestamp: Utc::now(),
        });
    }
}

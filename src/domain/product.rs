//! Catalog products.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Amount, ProductId};
use crate::error::DepotError;

/// Minimum product name length accepted by the catalog.
pub const MIN_PRODUCT_NAME_LEN: usize = 3;

/// Game a product delivers currency for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Game {
    /// Garena Free Fire.
    #[serde(rename = "Free Fire")]
    FreeFire,
    /// Mobile Legends: Bang Bang.
    #[serde(rename = "MLBB")]
    Mlbb,
}

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,
    /// Display name, e.g. `"100 Diamonds"`.
    pub name: String,
    /// Price charged to the wallet.
    pub price: Amount,
    /// Game the product belongs to.
    pub game: Game,
}

/// Editable product fields, validated before they reach the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductDraft {
    /// Display name.
    pub name: String,
    /// Price in currency subunits.
    pub price: Amount,
    /// Game the product belongs to.
    pub game: Game,
}

impl ProductDraft {
    /// Checks the draft and returns it with a trimmed name.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::InvalidRequest`] for a short name or a zero
    /// price.
    pub fn validated(self) -> Result<Self, DepotError> {
        let name = self.name.trim().to_string();
        if name.chars().count() < MIN_PRODUCT_NAME_LEN {
            return Err(DepotError::InvalidRequest(format!(
                "product name must be at least {MIN_PRODUCT_NAME_LEN} characters"
            )));
        }
        if self.price.is_zero() {
            return Err(DepotError::InvalidRequest(
                "product price must be positive".to_string(),
            ));
        }
        Ok(Self { name, ..self })
    }

    /// Builds a product with the given identifier.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            game: self.game,
        }
    }
}

//! Verified caller identity and role.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;
use crate::error::DepotError;

/// Role claim attached to a verified identity by the identity provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular storefront user.
    #[default]
    Customer,
    /// Operator allowed to review top-ups, orders, balances and catalog.
    Admin,
}

/// Caller identity as established from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider subject, also the wallet key.
    pub user_id: UserId,
    /// Email at the time the token was issued.
    pub email: String,
    /// Role claim.
    pub role: Role,
}

impl Identity {
    /// Creates a customer identity.
    #[must_use]
    pub fn customer(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id),
            email: email.into(),
            role: Role::Customer,
        }
    }

    /// Creates an administrator identity.
    #[must_use]
    pub fn admin(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id),
            email: email.into(),
            role: Role::Admin,
        }
    }

    /// Returns `true` when the identity carries the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Guards a privileged operation.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::Forbidden`] unless the identity is an admin.
    pub fn require_admin(&self) -> Result<(), DepotError> {
        if self.is_admin() {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.user_id, "privileged operation denied");
            Err(DepotError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_cannot_pass_admin_guard() {
        let user = Identity::customer("u1", "u1@example.com");
        assert!(matches!(user.require_admin(), Err(DepotError::Forbidden)));
    }

    #[test]
    fn admin_passes_guard() {
        let admin = Identity::admin("root", "ops@example.com");
        assert!(admin.require_admin().is_ok());
    }

    #[test]
    fn role_defaults_to_customer() {
        assert_eq!(Role::default(), Role::Customer);
    }
}

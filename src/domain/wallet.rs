//! Per-user wallet document.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Amount;
use crate::error::DepotError;

/// Stored wallet balance of one user, keyed by user id.
///
/// A missing wallet reads as [`Wallet::default`] (zero balance, agreement
/// not accepted).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Wallet {
    /// Spendable balance.
    pub balance: Amount,
    /// Whether the user accepted the storefront agreement.
    #[serde(default)]
    pub has_accepted_agreement: bool,
}

impl Wallet {
    /// Creates a wallet holding `balance`.
    #[must_use]
    pub const fn with_balance(balance: Amount) -> Self {
        Self {
            balance,
            has_accepted_agreement: false,
        }
    }

    /// Removes `amount` from the balance.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::InsufficientFunds`] and leaves the balance
    /// untouched if `amount` exceeds it.
    pub fn debit(&mut self, amount: Amount) -> Result<(), DepotError> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(DepotError::InsufficientFunds {
                balance: self.balance,
                required: amount,
            })?;
        Ok(())
    }

    /// Adds `amount` to the balance.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::AmountOverflow`] if the balance would overflow.
    pub fn credit(&mut self, amount: Amount) -> Result<(), DepotError> {
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn debit_within_balance() {
        let mut wallet = Wallet::with_balance(Amount::new(100));
        assert!(wallet.debit(Amount::new(50)).is_ok());
        assert_eq!(wallet.balance, Amount::new(50));
    }

    #[test]
    fn debit_beyond_balance_is_rejected_without_change() {
        let mut wallet = Wallet::with_balance(Amount::new(50));
        let Err(err) = wallet.debit(Amount::new(100)) else {
            panic!("expected insufficient funds");
        };
        assert!(matches!(
            err,
            DepotError::InsufficientFunds { balance, required }
                if balance == Amount::new(50) && required == Amount::new(100)
        ));
        assert_eq!(wallet.balance, Amount::new(50));
    }

    #[test]
    fn credit_adds() {
        let mut wallet = Wallet::default();
        assert!(wallet.credit(Amount::new(20)).is_ok());
        assert_eq!(wallet.balance, Amount::new(20));
    }

    #[test]
    fn missing_agreement_flag_deserializes_as_false() {
        let Ok(wallet) = serde_json::from_str::<Wallet>(r#"{"balance": 7}"#) else {
            panic!("deserialization failed");
        };
        assert!(!wallet.has_accepted_agreement);
        assert_eq!(wallet.balance, Amount::new(7));
    }
}

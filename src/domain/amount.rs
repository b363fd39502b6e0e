//! Non-negative monetary amounts.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DepotError;

/// Monetary amount in the smallest currency subunit (poisha for Taka).
///
/// Unsigned by construction, so a balance can never be negative. Additions
/// are checked and report [`DepotError::AmountOverflow`] instead of
/// wrapping.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = u64)]
pub struct Amount(u64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw subunit count.
    #[must_use]
    pub const fn new(subunits: u64) -> Self {
        Self(subunits)
    }

    /// Returns the raw subunit count.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns `true` for the zero amount.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::AmountOverflow`] if the sum exceeds `u64::MAX`.
    pub fn checked_add(self, other: Self) -> Result<Self, DepotError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(DepotError::AmountOverflow)
    }

    /// Subtracts `other`, returning `None` when it exceeds `self`.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Adds two amounts, clamping at the maximum. Used for reporting sums.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(subunits: u64) -> Self {
        Self(subunits)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

//! Wallet top-up requests awaiting manual payment verification.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Amount, Identity, TopUpId, UserId};
use crate::error::DepotError;

/// Mobile-payment rail the user claims to have paid through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PaymentMethod {
    /// bKash mobile wallet.
    #[serde(rename = "bKash")]
    BKash,
    /// Nagad mobile wallet.
    Nagad,
}

impl PaymentMethod {
    /// Every supported rail, in display order.
    pub const ALL: [Self; 2] = [Self::BKash, Self::Nagad];

    /// Wire name of the rail.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BKash => "bKash",
            Self::Nagad => "Nagad",
        }
    }
}

/// Review status of a top-up request. Terminal once it leaves `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TopUpStatus {
    /// Awaiting admin review.
    Pending,
    /// Verified; the amount was credited.
    Approved,
    /// Payment could not be verified.
    Rejected,
}

impl fmt::Display for TopUpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        };
        f.write_str(s)
    }
}

/// Admin verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// Credit the wallet and mark the request approved.
    Approve,
    /// Mark the request rejected without crediting.
    Reject,
}

/// A user's claim of having sent money externally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TopUpRequest {
    /// Request identifier.
    pub id: TopUpId,
    /// Requesting user.
    pub user_id: UserId,
    /// Requesting user's email at submission time.
    pub user_email: String,
    /// Amount claimed.
    pub amount: Amount,
    /// Payment rail used.
    pub payment_method: PaymentMethod,
    /// Transaction reference issued by the payment rail.
    pub transaction_ref: String,
    /// Review status.
    pub status: TopUpStatus,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Review timestamp, once reviewed.
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl TopUpRequest {
    /// Builds a `Pending` request.
    #[must_use]
    pub fn submit(
        requester: &Identity,
        amount: Amount,
        payment_method: PaymentMethod,
        transaction_ref: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TopUpId::new(),
            user_id: requester.user_id.clone(),
            user_email: requester.email.clone(),
            amount,
            payment_method,
            transaction_ref: transaction_ref.to_string(),
            status: TopUpStatus::Pending,
            created_at: now,
            reviewed_at: None,
        }
    }

    /// Applies `decision` to a pending request.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::TopUpAlreadyReviewed`] if the request is no
    /// longer `Pending`; the request is left unchanged.
    pub fn review(&mut self, decision: ReviewDecision, now: DateTime<Utc>) -> Result<(), DepotError> {
        if self.status != TopUpStatus::Pending {
            return Err(DepotError::TopUpAlreadyReviewed {
                id: self.id,
                status: self.status,
            });
        }
        self.status = match decision {
            ReviewDecision::Approve => TopUpStatus::Approved,
            ReviewDecision::Reject => TopUpStatus::Rejected,
        };
        self.reviewed_at = Some(now);
        Ok(())
    }
}

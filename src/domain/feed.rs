//! Unified, time-ordered view of a user's orders and top-ups.
//!
//! The merge is stateless: every update recomputes the whole sequence from
//! the two per-user snapshots.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Order, TopUpRequest, TopUpStatus};

/// Discriminator of a feed entry. Together with the record id it forms a
/// unique key, since orders and top-ups have disjoint id spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Wallet debit for an order.
    Order,
    /// Wallet credit claim.
    TopUp,
}

/// One row of the transaction feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedEntry {
    /// An order.
    Order(Order),
    /// A top-up request.
    TopUp(TopUpRequest),
}

impl FeedEntry {
    /// Returns the entry's kind.
    #[must_use]
    pub const fn kind(&self) -> FeedKind {
        match self {
            Self::Order(_) => FeedKind::Order,
            Self::TopUp(_) => FeedKind::TopUp,
        }
    }

    /// Event time used for ordering.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::Order(order) => order.created_at,
            Self::TopUp(top_up) => top_up.created_at,
        }
    }

    /// Record id as a UUID, for tie-breaking.
    #[must_use]
    pub const fn record_id(&self) -> &uuid::Uuid {
        match self {
            Self::Order(order) => order.id.as_uuid(),
            Self::TopUp(top_up) => top_up.id.as_uuid(),
        }
    }
}

/// Newest first; equal times fall back to `(kind, id)` so the order is
/// deterministic.
fn newest_first(a: &FeedEntry, b: &FeedEntry) -> Ordering {
    b.occurred_at()
        .cmp(&a.occurred_at())
        .then_with(|| a.kind().cmp(&b.kind()))
        .then_with(|| a.record_id().cmp(b.record_id()))
}

/// Merges the two snapshots into one sequence sorted newest first.
#[must_use]
pub fn merge(orders: Vec<Order>, top_ups: Vec<TopUpRequest>) -> Vec<FeedEntry> {
    let mut entries: Vec<FeedEntry> = Vec::with_capacity(orders.len() + top_ups.len());
    entries.extend(top_ups.into_iter().map(FeedEntry::TopUp));
    entries.extend(orders.into_iter().map(FeedEntry::Order));
    entries.sort_by(newest_first);
    entries
}

/// Dashboard "recent activity": orders plus approved top-ups only,
/// truncated to `limit` entries.
#[must_use]
pub fn recent_activity(
    orders: Vec<Order>,
    top_ups: Vec<TopUpRequest>,
    limit: usize,
) -> Vec<FeedEntry> {
    let approved = top_ups
        .into_iter()
        .filter(|t| t.status == TopUpStatus::Approved)
        .collect();
    let mut entries = merge(orders, approved);
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::{Amount, Game, Identity, PaymentMethod, Product, ProductId};

    fn order_at(at: DateTime<Utc>) -> Order {
        let product = Product {
            id: ProductId::new(),
            name: "210 Diamonds".to_string(),
            price: Amount::new(100),
            game: Game::FreeFire,
        };
        Order::place(&Identity::customer("u1", "u1@x.io"), &product, "99999", at)
    }

    fn top_up_at(at: DateTime<Utc>) -> TopUpRequest {
        TopUpRequest::submit(
            &Identity::customer("u1", "u1@x.io"),
            Amount::new(500),
            PaymentMethod::BKash,
            "TXREF",
            at,
        )
    }

    #[test]
    fn merge_interleaves_newest_first() {
        let t0 = Utc::now();
        let orders = vec![order_at(t0 + Duration::minutes(3)), order_at(t0)];
        let top_ups = vec![top_up_at(t0 + Duration::minutes(2)), top_up_at(t0 - Duration::minutes(1))];

        let feed = merge(orders, top_ups);
        let kinds: Vec<FeedKind> = feed.iter().map(FeedEntry::kind).collect();
        assert_eq!(
            kinds,
            vec![FeedKind::Order, FeedKind::TopUp, FeedKind::Order, FeedKind::TopUp]
        );
        assert!(
            feed.windows(2)
                .all(|w| matches!(w, [a, b] if a.occurred_at() >= b.occurred_at()))
        );
    }

    #[test]
    fn merge_of_empty_streams_is_empty() {
        assert!(merge(Vec::new(), Vec::new()).is_empty());
    }

    #[test]
    fn equal_timestamps_order_deterministically() {
        let t = Utc::now();
        let a = merge(vec![order_at(t)], vec![top_up_at(t)]);
        let kinds: Vec<FeedKind> = a.iter().map(FeedEntry::kind).collect();
        assert_eq!(kinds, vec![FeedKind::Order, FeedKind::TopUp]);
    }

    #[test]
    fn recent_activity_skips_unapproved_top_ups() {
        let t0 = Utc::now();
        let mut approved = top_up_at(t0);
        approved.status = TopUpStatus::Approved;
        let pending = top_up_at(t0 + Duration::minutes(1));

        let feed = recent_activity(vec![order_at(t0 - Duration::minutes(1))], vec![approved, pending], 5);
        assert_eq!(feed.len(), 2);
        assert!(feed.iter().all(|e| match e {
            FeedEntry::TopUp(t) => t.status == TopUpStatus::Approved,
            FeedEntry::Order(_) => true,
        }));
    }

    #[test]
    fn recent_activity_truncates() {
        let t0 = Utc::now();
        let orders = (0..5).map(|i| order_at(t0 + Duration::seconds(i))).collect();
        assert_eq!(recent_activity(orders, Vec::new(), 3).len(), 3);
    }
}

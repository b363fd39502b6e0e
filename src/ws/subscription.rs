//! Per-connection subscription manager.
//!
//! Tracks which topics a WebSocket client is subscribed to and filters
//! domain events by what the caller is allowed to see.

use std::collections::HashSet;

use super::messages::Topic;
use crate::domain::{DepotEvent, Identity};

/// Manages the topic subscriptions of a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    topics: HashSet<Topic>,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds topics to the subscription set.
    pub fn subscribe(&mut self, topics: &[Topic]) {
        self.topics.extend(topics.iter().copied());
    }

    /// Removes topics from the subscription set.
    pub fn unsubscribe(&mut self, topics: &[Topic]) {
        for topic in topics {
            self.topics.remove(topic);
        }
    }

    /// Returns `true` if the connection wants feed snapshots.
    #[must_use]
    pub fn wants_feed(&self) -> bool {
        self.topics.contains(&Topic::Feed)
    }

    /// Returns `true` if `event` should be forwarded to `caller`.
    ///
    /// Administrators see every event. Customers see their own events and
    /// the public catalog and banner changes.
    #[must_use]
    pub fn matches(&self, event: &DepotEvent, caller: &Identity) -> bool {
        if !self.topics.contains(&Topic::Events) {
            return false;
        }
        caller.is_admin() || event.user_id().is_none_or(|owner| *owner == caller.user_id)
    }

    /// Returns the active topics in a stable order.
    #[must_use]
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.topics.iter().copied().collect();
        topics.sort_by_key(|t| matches!(t, Topic::Events));
        topics
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{ProductId, UserId};

    fn agreement(user: &str) -> DepotEvent {
        DepotEvent::AgreementAccepted {
            user_id: UserId::new(user),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        let admin = Identity::admin("a", "a@example.com");
        assert!(!mgr.matches(&agreement("u1"), &admin));
        assert!(!mgr.wants_feed());
    }

    #[test]
    fn customers_only_see_their_own_events() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[Topic::Events]);
        let me = Identity::customer("me", "me@example.com");
        assert!(mgr.matches(&agreement("me"), &me));
        assert!(!mgr.matches(&agreement("someone-else"), &me));
    }

    #[test]
    fn public_events_reach_everyone() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[Topic::Events]);
        let removed = DepotEvent::ProductRemoved {
            product_id: ProductId::new(),
            timestamp: Utc::now(),
        };
        assert!(mgr.matches(&removed, &Identity::customer("c", "c@example.com")));
    }

    #[test]
    fn admins_see_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[Topic::Events]);
        assert!(mgr.matches(&agreement("u1"), &Identity::admin("a", "a@example.com")));
    }

    #[test]
    fn unsubscribe_removes_topic() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[Topic::Feed, Topic::Events]);
        assert_eq!(mgr.topics(), vec![Topic::Feed, Topic::Events]);
        mgr.unsubscribe(&[Topic::Feed]);
        assert!(!mgr.wants_feed());
        assert_eq!(mgr.topics(), vec![Topic::Events]);
    }
}

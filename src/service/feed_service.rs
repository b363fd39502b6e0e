//! Per-user transaction feed with live subscriptions.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::feed::{self, FeedEntry};
use crate::domain::{EventBus, UserId};
use crate::store::DocumentStore;

/// Builds merged order/top-up feeds and keeps subscribers up to date.
#[derive(Debug, Clone)]
pub struct FeedService {
    store: Arc<DocumentStore>,
    event_bus: EventBus,
    stream_limit: usize,
}

impl FeedService {
    /// Creates a new `FeedService`. Each of the two source streams is
    /// capped at `stream_limit` records.
    #[must_use]
    pub fn new(store: Arc<DocumentStore>, event_bus: EventBus, stream_limit: usize) -> Self {
        Self {
            store,
            event_bus,
            stream_limit,
        }
    }

    /// Returns the user's merged feed, newest first.
    pub async fn snapshot(&self, user_id: &UserId) -> Vec<FeedEntry> {
        let orders = self.store.orders_for_user(user_id, self.stream_limit).await;
        let top_ups = self.store.top_ups_for_user(user_id, self.stream_limit).await;
        feed::merge(orders, top_ups)
    }

    /// Returns the user's most recent orders and approved top-ups.
    pub async fn recent(&self, user_id: &UserId, limit: usize) -> Vec<FeedEntry> {
        let orders = self.store.orders_for_user(user_id, self.stream_limit).await;
        let top_ups = self.store.top_ups_for_user(user_id, self.stream_limit).await;
        feed::recent_activity(orders, top_ups, limit)
    }

    /// Starts a live subscription to a user's feed.
    ///
    /// The returned handle holds the current snapshot immediately and
    /// receives a freshly merged snapshot after every committed change to
    /// the user's orders or top-ups. Dropping the handle stops the
    /// background task.
    pub async fn subscribe(&self, user_id: UserId) -> FeedSubscription {
        // Subscribe before reading so no commit falls between the two.
        let mut events = self.event_bus.subscribe();
        let initial: Arc<[FeedEntry]> = self.snapshot(&user_id).await.into();
        let (tx, rx) = watch::channel(initial);

        let service = self.clone();
        let task = tokio::spawn(async move {
            tracing::debug!(%user_id, "feed subscription started");
            loop {
                tokio::select! {
                    () = tx.closed() => break,
                    event = events.recv() => match event {
                        Ok(event) => {
                            if !event.affects_feed() || event.user_id() != Some(&user_id) {
                                continue;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(%user_id, skipped, "feed subscription lagged, resyncing");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
                let next: Arc<[FeedEntry]> = service.snapshot(&user_id).await.into();
                if tx.send(next).is_err() {
                    break;
                }
            }
            tracing::debug!(%user_id, "feed subscription ended");
        });

        FeedSubscription { rx, task }
    }
}

/// Cancellation handle of a live feed subscription.
///
/// Every snapshot is an immutable shared slice; holders never observe a
/// partially updated feed.
#[derive(Debug)]
pub struct FeedSubscription {
    rx: watch::Receiver<Arc<[FeedEntry]>>,
    task: JoinHandle<()>,
}

impl FeedSubscription {
    /// Returns the latest snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<[FeedEntry]> {
        Arc::clone(&self.rx.borrow())
    }

    /// Waits for the next snapshot. Returns `None` once the subscription
    /// has ended.
    pub async fn changed(&mut self) -> Option<Arc<[FeedEntry]>> {
        self.rx.changed().await.ok()?;
        Some(Arc::clone(&self.rx.borrow_and_update()))
    }

    /// Stops the subscription.
    pub fn unsubscribe(self) {
        self.task.abort();
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::{Amount, FeedKind, Identity, PaymentMethod};
    use crate::service::{LedgerPolicy, LedgerService};

    fn setup() -> (LedgerService, FeedService, EventBus) {
        let store = Arc::new(DocumentStore::new(5));
        let bus = EventBus::new(64);
        let policy = LedgerPolicy {
            min_top_up: Amount::new(1),
            ..LedgerPolicy::default()
        };
        (
            LedgerService::new(Arc::clone(&store), bus.clone(), policy),
            FeedService::new(store, bus.clone(), 50),
            bus,
        )
    }

    async fn next(sub: &mut FeedSubscription) -> Arc<[FeedEntry]> {
        let Ok(Some(snapshot)) = tokio::time::timeout(Duration::from_secs(2), sub.changed()).await
        else {
            panic!("no feed update");
        };
        snapshot
    }

    #[tokio::test]
    async fn subscription_receives_initial_and_updated_snapshots() {
        let (ledger, feed, _) = setup();
        let user = Identity::customer("u1", "u1@example.com");

        let mut sub = feed.subscribe(user.user_id.clone()).await;
        assert!(sub.current().is_empty());

        let Ok(_) = ledger
            .submit_top_up(&user, Amount::new(100), PaymentMethod::BKash, "TX-001")
            .await
        else {
            panic!("submit failed");
        };
        let snapshot = next(&mut sub).await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.first().map(FeedEntry::kind), Some(FeedKind::TopUp));
    }

    #[tokio::test]
    async fn other_users_do_not_trigger_updates() {
        let (ledger, feed, _) = setup();
        let me = Identity::customer("me", "me@example.com");
        let other = Identity::customer("other", "other@example.com");
        let mut sub = feed.subscribe(me.user_id.clone()).await;

        let Ok(_) = ledger
            .submit_top_up(&other, Amount::new(5), PaymentMethod::Nagad, "OTHER1")
            .await
        else {
            panic!("submit failed");
        };
        let Ok(mine) = ledger
            .submit_top_up(&me, Amount::new(7), PaymentMethod::Nagad, "MINE01")
            .await
        else {
            panic!("submit failed");
        };

        let snapshot = next(&mut sub).await;
        assert_eq!(snapshot.len(), 1);
        let Some(FeedEntry::TopUp(entry)) = snapshot.first() else {
            panic!("expected a top-up entry");
        };
        assert_eq!(entry.id, mine.id);
    }

    #[tokio::test]
    async fn dropping_the_handle_releases_the_bus() {
        let (_, feed, bus) = setup();
        let sub = feed.subscribe(UserId::new("u1")).await;
        assert_eq!(bus.receiver_count(), 1);

        sub.unsubscribe();
        for _ in 0..50 {
            if bus.receiver_count() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(bus.receiver_count(), 0);
    }

    #[tokio::test]
    async fn snapshot_merges_both_streams() {
        let (ledger, feed, _) = setup();
        let user = Identity::customer("u1", "u1@example.com");
        for reference in ["REF-01", "REF-02"] {
            let Ok(_) = ledger
                .submit_top_up(&user, Amount::new(10), PaymentMethod::BKash, reference)
                .await
            else {
                panic!("submit failed");
            };
        }
        assert_eq!(feed.snapshot(&user.user_id).await.len(), 2);
        // Nothing approved yet.
        assert!(feed.recent(&user.user_id, 5).await.is_empty());
    }
}

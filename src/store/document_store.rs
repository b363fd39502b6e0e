//! In-process document store with optimistic multi-document transactions.
//!
//! All collections sit behind a single [`tokio::sync::RwLock`]. A transaction
//! body runs against the read guard and records the version of every
//! document it touches; commit re-acquires the store under the write lock
//! and applies the staged writes only if none of those versions moved.
//! Versions come from a store-wide commit sequence, so a document never
//! returns to a version it held before.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use super::DocKey;
use super::transaction::{Staged, Transaction, WriteSet};
use crate::domain::{
    Amount, Order, OrderId, Product, ProductId, PromoBanner, TopUpId, TopUpRequest, UserId, Wallet,
};
use crate::error::DepotError;

/// A document together with the commit that last wrote it.
#[derive(Debug, Clone)]
pub(super) struct Versioned<T> {
    pub(super) version: u64,
    pub(super) doc: T,
}

/// Every collection of the store.
#[derive(Debug, Default)]
pub(crate) struct Collections {
    pub(super) wallets: HashMap<UserId, Versioned<Wallet>>,
    pub(super) orders: HashMap<OrderId, Versioned<Order>>,
    pub(super) top_ups: HashMap<TopUpId, Versioned<TopUpRequest>>,
    pub(super) products: HashMap<ProductId, Versioned<Product>>,
    pub(super) banner: Option<Versioned<PromoBanner>>,
    commit_seq: u64,
}

impl Collections {
    /// Current version of a document; 0 when it does not exist.
    pub(super) fn version_of(&self, key: &DocKey) -> u64 {
        let version = match key {
            DocKey::Wallet(id) => self.wallets.get(id).map(|v| v.version),
            DocKey::Order(id) => self.orders.get(id).map(|v| v.version),
            DocKey::TopUp(id) => self.top_ups.get(id).map(|v| v.version),
            DocKey::Product(id) => self.products.get(id).map(|v| v.version),
            DocKey::Banner => self.banner.as_ref().map(|v| v.version),
        };
        version.unwrap_or(0)
    }

    fn document_json(&self, key: &DocKey) -> Result<Option<serde_json::Value>, DepotError> {
        let value = match key {
            DocKey::Wallet(id) => self.wallets.get(id).map(|v| serde_json::to_value(&v.doc)),
            DocKey::Order(id) => self.orders.get(id).map(|v| serde_json::to_value(&v.doc)),
            DocKey::TopUp(id) => self.top_ups.get(id).map(|v| serde_json::to_value(&v.doc)),
            DocKey::Product(id) => self.products.get(id).map(|v| serde_json::to_value(&v.doc)),
            DocKey::Banner => self.banner.as_ref().map(|v| serde_json::to_value(&v.doc)),
        };
        value
            .transpose()
            .map_err(|e| DepotError::Internal(format!("failed to serialize {key}: {e}")))
    }

    fn next_version(&mut self) -> u64 {
        self.commit_seq += 1;
        self.commit_seq
    }

    fn apply(&mut self, writes: WriteSet) {
        let version = self.next_version();
        for (id, doc) in writes.wallets {
            self.wallets.insert(id, Versioned { version, doc });
        }
        for (id, doc) in writes.orders {
            self.orders.insert(id, Versioned { version, doc });
        }
        for (id, doc) in writes.top_ups {
            self.top_ups.insert(id, Versioned { version, doc });
        }
        for (id, doc) in writes.products {
            match doc {
                Some(doc) => {
                    self.products.insert(id, Versioned { version, doc });
                }
                None => {
                    self.products.remove(&id);
                }
            }
        }
        if let Some(doc) = writes.banner {
            self.banner = Some(Versioned { version, doc });
        }
    }
}

/// Document counts, reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StoreStats {
    /// Number of wallets.
    pub wallets: usize,
    /// Number of orders.
    pub orders: usize,
    /// Number of top-up requests.
    pub top_ups: usize,
    /// Number of catalog products.
    pub products: usize,
}

/// Commit rejected because a document read by the transaction changed.
#[derive(Debug)]
struct StaleRead(DocKey);

/// Shared document store.
///
/// # Concurrency
///
/// - Queries and transaction bodies run concurrently under the read lock.
/// - Commits are serialized under the write lock.
/// - A commit whose read set went stale is discarded and the body re-run,
///   up to `max_attempts` times.
#[derive(Debug)]
pub struct DocumentStore {
    inner: RwLock<Collections>,
    max_attempts: u32,
}

impl DocumentStore {
    /// Creates an empty store that retries conflicting transactions up to
    /// `max_attempts` times (at least once).
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            inner: RwLock::new(Collections::default()),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Runs `body` as an atomic read-modify-write transaction.
    ///
    /// The body may be executed several times and must not have side
    /// effects outside the [`Transaction`]. If it returns an error the
    /// transaction is abandoned and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns the body's own error, or [`DepotError::TransactionConflict`]
    /// once every attempt lost to a concurrent commit.
    pub async fn run_transaction<T, F>(&self, mut body: F) -> Result<T, DepotError>
    where
        F: FnMut(&mut Transaction<'_>) -> Result<T, DepotError> + Send,
        T: Send,
    {
        for attempt in 1..=self.max_attempts {
            let (value, staged) = self.execute(&mut body).await?;
            match self.commit(staged).await {
                Ok(()) => return Ok(value),
                Err(StaleRead(key)) => {
                    tracing::debug!(attempt, document = %key, "transaction conflict, retrying");
                }
            }
        }
        tracing::warn!(attempts = self.max_attempts, "transaction retries exhausted");
        Err(DepotError::TransactionConflict {
            attempts: self.max_attempts,
        })
    }

    async fn execute<T, F>(&self, body: &mut F) -> Result<(T, Staged), DepotError>
    where
        F: FnMut(&mut Transaction<'_>) -> Result<T, DepotError>,
    {
        let guard = self.inner.read().await;
        let mut tx = Transaction::new(&guard);
        let value = body(&mut tx)?;
        Ok((value, tx.into_staged()))
    }

    async fn commit(&self, staged: Staged) -> Result<(), StaleRead> {
        if staged.writes.is_empty() {
            return Ok(());
        }
        let mut guard = self.inner.write().await;
        if let Some(key) = staged
            .reads
            .into_iter()
            .find_map(|(key, seen)| (guard.version_of(&key) != seen).then_some(key))
        {
            return Err(StaleRead(key));
        }
        guard.apply(staged.writes);
        Ok(())
    }

    /// Overwrites a wallet balance without reading it first, creating the
    /// wallet if absent. Returns the previous balance.
    ///
    /// The write takes a fresh version, so in-flight transactions that read
    /// this wallet fail validation and retry.
    pub async fn overwrite_wallet_balance(&self, user_id: &UserId, balance: Amount) -> Amount {
        let mut guard = self.inner.write().await;
        let version = guard.next_version();
        let entry = guard
            .wallets
            .entry(user_id.clone())
            .or_insert_with(|| Versioned {
                version,
                doc: Wallet::default(),
            });
        let previous = entry.doc.balance;
        entry.doc.balance = balance;
        entry.version = version;
        previous
    }

    /// Returns a user's wallet, if it exists.
    pub async fn wallet(&self, user_id: &UserId) -> Option<Wallet> {
        self.inner
            .read()
            .await
            .wallets
            .get(user_id)
            .map(|v| v.doc.clone())
    }

    /// Returns every wallet, ordered by user id.
    pub async fn wallets(&self) -> Vec<(UserId, Wallet)> {
        let guard = self.inner.read().await;
        let mut wallets: Vec<(UserId, Wallet)> = guard
            .wallets
            .iter()
            .map(|(id, v)| (id.clone(), v.doc.clone()))
            .collect();
        wallets.sort_by(|a, b| a.0.cmp(&b.0));
        wallets
    }

    /// Returns an order.
    pub async fn order(&self, id: OrderId) -> Option<Order> {
        self.inner.read().await.orders.get(&id).map(|v| v.doc.clone())
    }

    /// Returns every order, newest first.
    pub async fn orders(&self) -> Vec<Order> {
        self.orders_where(|_| true, usize::MAX).await
    }

    /// Returns up to `limit` of a user's orders, newest first.
    pub async fn orders_for_user(&self, user_id: &UserId, limit: usize) -> Vec<Order> {
        self.orders_where(|o| &o.user_id == user_id, limit).await
    }

    /// Returns every order placed for a game player id, newest first.
    pub async fn orders_for_player(&self, player_id: &str) -> Vec<Order> {
        self.orders_where(|o| o.player_id == player_id, usize::MAX)
            .await
    }

    async fn orders_where(&self, keep: impl Fn(&Order) -> bool, limit: usize) -> Vec<Order> {
        let guard = self.inner.read().await;
        let mut orders: Vec<Order> = guard
            .orders
            .values()
            .filter(|v| keep(&v.doc))
            .map(|v| v.doc.clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        orders.truncate(limit);
        orders
    }

    /// Returns a top-up request.
    pub async fn top_up(&self, id: TopUpId) -> Option<TopUpRequest> {
        self.inner
            .read()
            .await
            .top_ups
            .get(&id)
            .map(|v| v.doc.clone())
    }

    /// Returns every top-up request, newest first.
    pub async fn top_ups(&self) -> Vec<TopUpRequest> {
        self.top_ups_where(|_| true, usize::MAX).await
    }

    /// Returns up to `limit` of a user's top-up requests, newest first.
    pub async fn top_ups_for_user(&self, user_id: &UserId, limit: usize) -> Vec<TopUpRequest> {
        self.top_ups_where(|t| &t.user_id == user_id, limit).await
    }

    async fn top_ups_where(
        &self,
        keep: impl Fn(&TopUpRequest) -> bool,
        limit: usize,
    ) -> Vec<TopUpRequest> {
        let guard = self.inner.read().await;
        let mut top_ups: Vec<TopUpRequest> = guard
            .top_ups
            .values()
            .filter(|v| keep(&v.doc))
            .map(|v| v.doc.clone())
            .collect();
        top_ups.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        top_ups.truncate(limit);
        top_ups
    }

    /// Returns a product.
    pub async fn product(&self, id: ProductId) -> Option<Product> {
        self.inner
            .read()
            .await
            .products
            .get(&id)
            .map(|v| v.doc.clone())
    }

    /// Returns the catalog ordered by ascending price, then name.
    pub async fn products(&self) -> Vec<Product> {
        let guard = self.inner.read().await;
        let mut products: Vec<Product> = guard.products.values().map(|v| v.doc.clone()).collect();
        products.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.name.cmp(&b.name)));
        products
    }

    /// Returns the promo banner, or the disabled default.
    pub async fn banner(&self) -> PromoBanner {
        self.inner
            .read()
            .await
            .banner
            .as_ref()
            .map(|v| v.doc.clone())
            .unwrap_or_default()
    }

    /// Returns document counts.
    pub async fn stats(&self) -> StoreStats {
        let guard = self.inner.read().await;
        StoreStats {
            wallets: guard.wallets.len(),
            orders: guard.orders.len(),
            top_ups: guard.top_ups.len(),
            products: guard.products.len(),
        }
    }

    /// Serializes the current content of each document in `keys`, all read
    /// under one lock so the result reflects a single committed state.
    /// Missing documents yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::Internal`] if serialization fails.
    pub async fn documents_json(
        &self,
        keys: &[DocKey],
    ) -> Result<Vec<(DocKey, Option<serde_json::Value>)>, DepotError> {
        let guard = self.inner.read().await;
        let mut documents = Vec::with_capacity(keys.len());
        for key in keys {
            documents.push((key.clone(), guard.document_json(key)?));
        }
        Ok(documents)
    }

    /// Serializes every document in the store from one consistent state.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::Internal`] if serialization fails.
    pub async fn all_documents_json(&self) -> Result<Vec<(DocKey, serde_json::Value)>, DepotError> {
        let guard = self.inner.read().await;
        let keys = guard
            .wallets
            .keys()
            .map(|id| DocKey::Wallet(id.clone()))
            .chain(guard.orders.keys().map(|id| DocKey::Order(*id)))
            .chain(guard.top_ups.keys().map(|id| DocKey::TopUp(*id)))
            .chain(guard.products.keys().map(|id| DocKey::Product(*id)))
            .chain(guard.banner.as_ref().map(|_| DocKey::Banner));
        let mut documents = Vec::new();
        for key in keys {
            if let Some(json) = guard.document_json(&key)? {
                documents.push((key, json));
            }
        }
        Ok(documents)
    }

    /// Loads previously persisted documents, replacing any in-memory copy.
    /// Returns the number of documents loaded.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::PersistenceError`] if a document does not
    /// deserialize into its collection's type. Nothing is loaded in that
    /// case.
    pub async fn hydrate(
        &self,
        documents: impl IntoIterator<Item = (DocKey, serde_json::Value)>,
    ) -> Result<usize, DepotError> {
        let mut writes = WriteSet::default();
        let mut loaded = 0_usize;
        for (key, json) in documents {
            let bad = |e: serde_json::Error| {
                DepotError::PersistenceError(format!("corrupt document {key}: {e}"))
            };
            match &key {
                DocKey::Wallet(id) => {
                    writes
                        .wallets
                        .insert(id.clone(), serde_json::from_value(json).map_err(bad)?);
                }
                DocKey::Order(id) => {
                    writes
                        .orders
                        .insert(*id, serde_json::from_value(json).map_err(bad)?);
                }
                DocKey::TopUp(id) => {
                    writes
                        .top_ups
                        .insert(*id, serde_json::from_value(json).map_err(bad)?);
                }
                DocKey::Product(id) => {
                    writes
                        .products
                        .insert(*id, Some(serde_json::from_value(json).map_err(bad)?));
                }
                DocKey::Banner => {
                    writes.banner = Some(serde_json::from_value(json).map_err(bad)?);
                }
            }
            loaded += 1;
        }
        if !writes.is_empty() {
            self.inner.write().await.apply(writes);
        }
        Ok(loaded)
    }
}

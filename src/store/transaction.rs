//! Read-modify-write transaction context.

use std::collections::HashMap;

use super::DocKey;
use super::document_store::Collections;
use crate::domain::{
    Order, OrderId, Product, ProductId, PromoBanner, TopUpId, TopUpRequest, UserId, Wallet,
};

/// Writes staged by a transaction body, applied together at commit.
#[derive(Debug, Default)]
pub(super) struct WriteSet {
    pub(super) wallets: HashMap<UserId, Wallet>,
    pub(super) orders: HashMap<OrderId, Order>,
    pub(super) top_ups: HashMap<TopUpId, TopUpRequest>,
    /// `None` deletes the product.
    pub(super) products: HashMap<ProductId, Option<Product>>,
    pub(super) banner: Option<PromoBanner>,
}

impl WriteSet {
    pub(super) fn is_empty(&self) -> bool {
        self.wallets.is_empty()
            && self.orders.is_empty()
            && self.top_ups.is_empty()
            && self.products.is_empty()
            && self.banner.is_none()
    }
}

/// Outcome of running a transaction body: the versions it observed and the
/// writes it wants to apply.
#[derive(Debug, Default)]
pub(super) struct Staged {
    pub(super) reads: HashMap<DocKey, u64>,
    pub(super) writes: WriteSet,
}

/// Handle passed to a transaction body.
///
/// Reads come from a consistent snapshot and record the version observed
/// (a missing document is version 0). Reads of a document already written
/// in this transaction see the staged value. Nothing is visible to other
/// callers until the store commits the staged writes.
#[derive(Debug)]
pub struct Transaction<'a> {
    snapshot: &'a Collections,
    staged: Staged,
}

impl<'a> Transaction<'a> {
    pub(super) fn new(snapshot: &'a Collections) -> Self {
        Self {
            snapshot,
            staged: Staged::default(),
        }
    }

    pub(super) fn into_staged(self) -> Staged {
        self.staged
    }

    fn observe(&mut self, key: DocKey) {
        let version = self.snapshot.version_of(&key);
        self.staged.reads.entry(key).or_insert(version);
    }

    /// Reads a wallet, `None` if the user has none yet.
    pub fn wallet(&mut self, user_id: &UserId) -> Option<Wallet> {
        if let Some(staged) = self.staged.writes.wallets.get(user_id) {
            return Some(staged.clone());
        }
        self.observe(DocKey::Wallet(user_id.clone()));
        self.snapshot.wallets.get(user_id).map(|v| v.doc.clone())
    }

    /// Stages a wallet write.
    pub fn put_wallet(&mut self, user_id: UserId, wallet: Wallet) {
        self.staged.writes.wallets.insert(user_id, wallet);
    }

    /// Reads an order.
    pub fn order(&mut self, id: OrderId) -> Option<Order> {
        if let Some(staged) = self.staged.writes.orders.get(&id) {
            return Some(staged.clone());
        }
        self.observe(DocKey::Order(id));
        self.snapshot.orders.get(&id).map(|v| v.doc.clone())
    }

    /// Stages an order write.
    pub fn put_order(&mut self, order: Order) {
        self.staged.writes.orders.insert(order.id, order);
    }

    /// Reads a top-up request.
    pub fn top_up(&mut self, id: TopUpId) -> Option<TopUpRequest> {
        if let Some(staged) = self.staged.writes.top_ups.get(&id) {
            return Some(staged.clone());
        }
        self.observe(DocKey::TopUp(id));
        self.snapshot.top_ups.get(&id).map(|v| v.doc.clone())
    }

    /// Stages a top-up request write.
    pub fn put_top_up(&mut self, top_up: TopUpRequest) {
        self.staged.writes.top_ups.insert(top_up.id, top_up);
    }

    /// Reads a product.
    pub fn product(&mut self, id: ProductId) -> Option<Product> {
        if let Some(staged) = self.staged.writes.products.get(&id) {
            return staged.clone();
        }
        self.observe(DocKey::Product(id));
        self.snapshot.products.get(&id).map(|v| v.doc.clone())
    }

    /// Stages a product write.
    pub fn put_product(&mut self, product: Product) {
        self.staged.writes.products.insert(product.id, Some(product));
    }

    /// Stages a product deletion.
    pub fn delete_product(&mut self, id: ProductId) {
        self.staged.writes.products.insert(id, None);
    }

    /// Stages a promo banner write.
    pub fn put_banner(&mut self, banner: PromoBanner) {
        self.staged.writes.banner = Some(banner);
    }
}

//! Background task that mirrors committed changes into PostgreSQL.
//!
//! The in-memory store stays authoritative. The mirror follows the event
//! bus and writes, per event, the log row and the current content of every
//! document the event touched in one database transaction. When the mirror
//! falls behind the bus or a write fails, it rewrites the whole document
//! table from a store snapshot before continuing.

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;

use super::postgres::PostgresPersistence;
use crate::domain::{DepotEvent, EventBus};
use crate::error::DepotError;
use crate::store::{DocKey, DocumentStore};

/// Destination of mirrored changes.
pub trait MirrorSink: Send + Sync + 'static {
    /// Writes one event and the documents it touched, atomically.
    fn write_commit(
        &self,
        event: &DepotEvent,
        documents: &[(DocKey, Option<serde_json::Value>)],
    ) -> impl Future<Output = Result<(), DepotError>> + Send;

    /// Replaces every stored document, atomically.
    fn replace_documents(
        &self,
        documents: &[(DocKey, serde_json::Value)],
    ) -> impl Future<Output = Result<usize, DepotError>> + Send;
}

impl MirrorSink for PostgresPersistence {
    async fn write_commit(
        &self,
        event: &DepotEvent,
        documents: &[(DocKey, Option<serde_json::Value>)],
    ) -> Result<(), DepotError> {
        Self::write_commit(self, event, documents).await
    }

    async fn replace_documents(
        &self,
        documents: &[(DocKey, serde_json::Value)],
    ) -> Result<usize, DepotError> {
        Self::replace_documents(self, documents).await
    }
}

/// Documents whose content changed in the commit behind `event`.
#[must_use]
pub fn documents_touched(event: &DepotEvent) -> Vec<DocKey> {
    match event {
        DepotEvent::OrderPlaced { order, .. } => {
            vec![DocKey::Order(order.id), DocKey::Wallet(order.user_id.clone())]
        }
        DepotEvent::OrderStatusChanged {
            order, refunded, ..
        } => {
            let mut keys = vec![DocKey::Order(order.id)];
            if refunded.is_some() {
                keys.push(DocKey::Wallet(order.user_id.clone()));
            }
            keys
        }
        DepotEvent::TopUpSubmitted { top_up, .. } => vec![DocKey::TopUp(top_up.id)],
        DepotEvent::TopUpReviewed {
            top_up,
            balance_after,
            ..
        } => {
            let mut keys = vec![DocKey::TopUp(top_up.id)];
            if balance_after.is_some() {
                keys.push(DocKey::Wallet(top_up.user_id.clone()));
            }
            keys
        }
        DepotEvent::BalanceOverridden { user_id, .. }
        | DepotEvent::AgreementAccepted { user_id, .. } => vec![DocKey::Wallet(user_id.clone())],
        DepotEvent::ProductUpserted { product, .. } => vec![DocKey::Product(product.id)],
        DepotEvent::ProductRemoved { product_id, .. } => vec![DocKey::Product(*product_id)],
        DepotEvent::BannerUpdated { .. } => vec![DocKey::Banner],
    }
}

/// Loads every mirrored document into `store`. Returns the number loaded.
///
/// # Errors
///
/// Returns [`DepotError::PersistenceError`] on database failure or if a
/// stored row does not match its collection.
pub async fn restore(
    persistence: &PostgresPersistence,
    store: &DocumentStore,
) -> Result<usize, DepotError> {
    let rows = persistence.load_documents().await?;
    let mut documents = Vec::with_capacity(rows.len());
    for row in rows {
        documents.push((DocKey::parse(&row.collection, &row.doc_id)?, row.body));
    }
    store.hydrate(documents).await
}

/// Writes one event and the documents it touched.
///
/// # Errors
///
/// Returns [`DepotError::PersistenceError`] on database failure.
pub async fn mirror_event(
    sink: &impl MirrorSink,
    store: &DocumentStore,
    event: &DepotEvent,
) -> Result<(), DepotError> {
    let documents = store.documents_json(&documents_touched(event)).await?;
    sink.write_commit(event, &documents).await
}

/// Rewrites every mirrored document from the store's current state.
/// Returns the number of documents written.
///
/// # Errors
///
/// Returns [`DepotError::PersistenceError`] on database failure.
pub async fn resync(sink: &impl MirrorSink, store: &DocumentStore) -> Result<usize, DepotError> {
    let documents = store.all_documents_json().await?;
    sink.replace_documents(&documents).await
}

/// Handle of the running mirror task.
#[derive(Debug)]
#[must_use = "dropping the handle stops the mirror"]
pub struct MirrorHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl MirrorHandle {
    /// Stops the mirror after it has written every event already on the
    /// bus, and waits for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "persistence mirror task failed");
        }
    }
}

/// Spawns the mirror task. It runs until [`MirrorHandle::shutdown`] or
/// until the event bus closes.
pub fn spawn_mirror<S: MirrorSink>(
    sink: S,
    store: Arc<DocumentStore>,
    event_bus: &EventBus,
) -> MirrorHandle {
    let mut events = event_bus.subscribe();
    let (shutdown, mut stop) = oneshot::channel();
    let task = tokio::spawn(async move {
        let mut mirror = Mirror {
            sink,
            store,
            resync_due: false,
        };
        loop {
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Ok(event) => mirror.handle(&event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "persistence mirror lagged, resyncing");
                        mirror.resync().await;
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = &mut stop => {
                    mirror.drain(&mut events).await;
                    break;
                }
            }
        }
        if mirror.resync_due {
            mirror.resync().await;
        }
        tracing::info!("persistence mirror stopped");
    });
    MirrorHandle { shutdown, task }
}

struct Mirror<S> {
    sink: S,
    store: Arc<DocumentStore>,
    resync_due: bool,
}

impl<S: MirrorSink> Mirror<S> {
    async fn handle(&mut self, event: &DepotEvent) {
        if self.resync_due {
            self.resync().await;
        }
        if let Err(e) = mirror_event(&self.sink, &self.store, event).await {
            tracing::error!(
                error = %e,
                event_type = event.event_type_str(),
                "failed to mirror event"
            );
            self.resync_due = true;
        }
    }

    async fn resync(&mut self) {
        match resync(&self.sink, &self.store).await {
            Ok(documents) => {
                tracing::info!(documents, "persistence mirror resynced");
                self.resync_due = false;
            }
            Err(e) => {
                tracing::error!(error = %e, "persistence mirror resync failed");
                self.resync_due = true;
            }
        }
    }

    async fn drain(&mut self, events: &mut broadcast::Receiver<DepotEvent>) {
        loop {
            match events.try_recv() {
                Ok(event) => self.handle(&event).await,
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "persistence mirror lagged, resyncing");
                    self.resync().await;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}

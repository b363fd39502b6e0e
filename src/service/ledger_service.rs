//! Wallet ledger: every balance mutation, each inside one atomic store
//! transaction together with the record that causes it.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    Amount, DepotEvent, EventBus, Identity, Order, OrderId, OrderStatus, PaymentMethod, ProductId,
    ReviewDecision, TopUpId, TopUpRequest, TopUpStatus, UserId, Wallet,
};
use crate::error::DepotError;
use crate::store::DocumentStore;

/// Input limits enforced before a ledger transaction starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPolicy {
    /// Smallest accepted top-up amount.
    pub min_top_up: Amount,
    /// Minimum trimmed length of a game player id.
    pub min_player_id_len: usize,
    /// Minimum trimmed length of a payment transaction reference.
    pub min_transaction_ref_len: usize,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            min_top_up: Amount::new(1000),
            min_player_id_len: 5,
            min_transaction_ref_len: 5,
        }
    }
}

/// Orchestrates wallet debits, credits and refunds.
///
/// Each mutation method follows the same pattern: validate input, run one
/// store transaction that reads and writes every affected document, then
/// emit a [`DepotEvent`] once the commit succeeded. Privileged methods
/// check the caller's role before touching the store.
#[derive(Debug, Clone)]
pub struct LedgerService {
    store: Arc<DocumentStore>,
    event_bus: EventBus,
    policy: LedgerPolicy,
}

impl LedgerService {
    /// Creates a new `LedgerService`.
    #[must_use]
    pub fn new(store: Arc<DocumentStore>, event_bus: EventBus, policy: LedgerPolicy) -> Self {
        Self {
            store,
            event_bus,
            policy,
        }
    }

    /// Returns the active input limits.
    #[must_use]
    pub const fn policy(&self) -> &LedgerPolicy {
        &self.policy
    }

    /// Buys a product for `player_id`, paying from the buyer's wallet.
    ///
    /// The product read, balance check, debit and order creation commit
    /// together; a rejected purchase leaves no order and no debit behind.
    ///
    /// # Errors
    ///
    /// - [`DepotError::InvalidRequest`] if the player id is too short.
    /// - [`DepotError::ProductNotFound`] if the product does not exist.
    /// - [`DepotError::InsufficientFunds`] if the balance is below the price.
    /// - [`DepotError::TransactionConflict`] if retries are exhausted.
    pub async fn place_order(
        &self,
        buyer: &Identity,
        product_id: ProductId,
        player_id: &str,
    ) -> Result<Order, DepotError> {
        let player_id = player_id.trim();
        if player_id.chars().count() < self.policy.min_player_id_len {
            return Err(DepotError::InvalidRequest(format!(
                "player id must be at least {} characters",
                self.policy.min_player_id_len
            )));
        }

        let now = Utc::now();
        let result = self
            .store
            .run_transaction(|tx| {
                let product = tx
                    .product(product_id)
                    .ok_or(DepotError::ProductNotFound(product_id))?;
                let mut wallet = tx.wallet(&buyer.user_id).unwrap_or_default();
                wallet.debit(product.price)?;

                let order = Order::place(buyer, &product, player_id, now);
                let balance_after = wallet.balance;
                tx.put_wallet(buyer.user_id.clone(), wallet);
                tx.put_order(order.clone());
                Ok((order, balance_after))
            })
            .await;

        let (order, balance_after) = match result {
            Ok(placed) => placed,
            Err(e) => {
                tracing::info!(user_id = %buyer.user_id, %product_id, error = %e, "order rejected");
                return Err(e);
            }
        };

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            price = %order.product_price,
            %balance_after,
            "order placed"
        );
        let _ = self.event_bus.publish(DepotEvent::OrderPlaced {
            order: order.clone(),
            balance_after,
            timestamp: now,
        });
        Ok(order)
    }

    /// Files a claim that money was sent through a payment rail. The
    /// wallet is untouched until an administrator approves it.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::InvalidRequest`] if the amount is below the
    /// minimum or the transaction reference is too short.
    pub async fn submit_top_up(
        &self,
        requester: &Identity,
        amount: Amount,
        payment_method: PaymentMethod,
        transaction_ref: &str,
    ) -> Result<TopUpRequest, DepotError> {
        if amount < self.policy.min_top_up {
            return Err(DepotError::InvalidRequest(format!(
                "top-up amount must be at least {}",
                self.policy.min_top_up
            )));
        }
        let transaction_ref = transaction_ref.trim();
        if transaction_ref.chars().count() < self.policy.min_transaction_ref_len {
            return Err(DepotError::InvalidRequest(format!(
                "transaction reference must be at least {} characters",
                self.policy.min_transaction_ref_len
            )));
        }

        let now = Utc::now();
        let top_up = self
            .store
            .run_transaction(|tx| {
                let top_up =
                    TopUpRequest::submit(requester, amount, payment_method, transaction_ref, now);
                tx.put_top_up(top_up.clone());
                Ok(top_up)
            })
            .await?;

        tracing::info!(
            top_up_id = %top_up.id,
            user_id = %top_up.user_id,
            %amount,
            method = payment_method.as_str(),
            "top-up submitted"
        );
        let _ = self.event_bus.publish(DepotEvent::TopUpSubmitted {
            top_up: top_up.clone(),
            timestamp: now,
        });
        Ok(top_up)
    }

    /// Approves or rejects a pending top-up request. Approval credits the
    /// requester's wallet in the same transaction, creating it if absent.
    ///
    /// The status is re-read inside the transaction, so of two concurrent
    /// approvals exactly one credits; the other retries, sees the request
    /// already approved and fails.
    ///
    /// # Errors
    ///
    /// - [`DepotError::Forbidden`] if the caller is not an administrator.
    /// - [`DepotError::TopUpNotFound`] if the request does not exist.
    /// - [`DepotError::TopUpAlreadyReviewed`] if it is no longer pending.
    pub async fn review_top_up(
        &self,
        admin: &Identity,
        top_up_id: TopUpId,
        decision: ReviewDecision,
    ) -> Result<TopUpRequest, DepotError> {
        admin.require_admin()?;

        let now = Utc::now();
        let (top_up, balance_after) = self
            .store
            .run_transaction(|tx| {
                let mut top_up = tx
                    .top_up(top_up_id)
                    .ok_or(DepotError::TopUpNotFound(top_up_id))?;
                top_up.review(decision, now)?;

                let balance_after = if top_up.status == TopUpStatus::Approved {
                    let mut wallet = tx.wallet(&top_up.user_id).unwrap_or_default();
                    wallet.credit(top_up.amount)?;
                    let balance = wallet.balance;
                    tx.put_wallet(top_up.user_id.clone(), wallet);
                    Some(balance)
                } else {
                    None
                };
                tx.put_top_up(top_up.clone());
                Ok((top_up, balance_after))
            })
            .await?;

        tracing::info!(
            %top_up_id,
            user_id = %top_up.user_id,
            status = %top_up.status,
            reviewer = %admin.user_id,
            "top-up reviewed"
        );
        let _ = self.event_bus.publish(DepotEvent::TopUpReviewed {
            top_up: top_up.clone(),
            balance_after,
            timestamp: now,
        });
        Ok(top_up)
    }

    /// Sets an order's status. The first move into `Failed` refunds the
    /// order price to the buyer's wallet in the same transaction; every
    /// other change is a plain status write.
    ///
    /// # Errors
    ///
    /// - [`DepotError::Forbidden`] if the caller is not an administrator.
    /// - [`DepotError::OrderNotFound`] if the order does not exist.
    pub async fn review_order(
        &self,
        admin: &Identity,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> Result<Order, DepotError> {
        admin.require_admin()?;

        let now = Utc::now();
        let change = self
            .store
            .run_transaction(|tx| {
                let mut order = tx
                    .order(order_id)
                    .ok_or(DepotError::OrderNotFound(order_id))?;
                let previous_status = order.status;

                let mut refund = None;
                if order.refund_due(new_status) {
                    let mut wallet = tx.wallet(&order.user_id).unwrap_or_default();
                    wallet.credit(order.product_price)?;
                    refund = Some((order.product_price, wallet.balance));
                    tx.put_wallet(order.user_id.clone(), wallet);
                    order.refunded = true;
                }
                order.status = new_status;
                order.updated_at = now;
                tx.put_order(order.clone());
                Ok(StatusChange {
                    order,
                    previous_status,
                    refund,
                })
            })
            .await?;

        let StatusChange {
            order,
            previous_status,
            refund,
        } = change;
        tracing::info!(
            %order_id,
            from = %previous_status,
            to = %new_status,
            refunded = refund.is_some(),
            reviewer = %admin.user_id,
            "order status changed"
        );
        let _ = self.event_bus.publish(DepotEvent::OrderStatusChanged {
            order: order.clone(),
            previous_status,
            refunded: refund.map(|(amount, _)| amount),
            balance_after: refund.map(|(_, balance)| balance),
            timestamp: now,
        });
        Ok(order)
    }

    /// Overwrites a wallet balance, creating the wallet if absent. This is
    /// the only balance change without a causal ledger record. Returns the
    /// previous balance.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::Forbidden`] if the caller is not an
    /// administrator.
    pub async fn edit_balance(
        &self,
        admin: &Identity,
        user_id: &UserId,
        new_balance: Amount,
    ) -> Result<Amount, DepotError> {
        admin.require_admin()?;

        let previous_balance = self
            .store
            .overwrite_wallet_balance(user_id, new_balance)
            .await;

        tracing::warn!(
            %user_id,
            %previous_balance,
            %new_balance,
            admin = %admin.user_id,
            "wallet balance overridden"
        );
        let _ = self.event_bus.publish(DepotEvent::BalanceOverridden {
            user_id: user_id.clone(),
            previous_balance,
            new_balance,
            timestamp: Utc::now(),
        });
        Ok(previous_balance)
    }

    /// Records that the caller accepted the storefront agreement. Accepting
    /// twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::TransactionConflict`] if retries are exhausted.
    pub async fn accept_agreement(&self, identity: &Identity) -> Result<Wallet, DepotError> {
        let (wallet, changed) = self
            .store
            .run_transaction(|tx| {
                let mut wallet = tx.wallet(&identity.user_id).unwrap_or_default();
                if wallet.has_accepted_agreement {
                    return Ok((wallet, false));
                }
                wallet.has_accepted_agreement = true;
                tx.put_wallet(identity.user_id.clone(), wallet.clone());
                Ok((wallet, true))
            })
            .await?;

        if changed {
            tracing::info!(user_id = %identity.user_id, "agreement accepted");
            let _ = self.event_bus.publish(DepotEvent::AgreementAccepted {
                user_id: identity.user_id.clone(),
                timestamp: Utc::now(),
            });
        }
        Ok(wallet)
    }

    /// Returns the caller's wallet; a user without one has a zero balance.
    pub async fn wallet(&self, identity: &Identity) -> Wallet {
        self.store
            .wallet(&identity.user_id)
            .await
            .unwrap_or_default()
    }

    /// Returns the caller's orders, newest first.
    pub async fn orders_for(&self, identity: &Identity, limit: usize) -> Vec<Order> {
        self.store.orders_for_user(&identity.user_id, limit).await
    }

    /// Returns the caller's top-up requests, newest first.
    pub async fn top_ups_for(&self, identity: &Identity, limit: usize) -> Vec<TopUpRequest> {
        self.store.top_ups_for_user(&identity.user_id, limit).await
    }

    /// Returns every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::Forbidden`] if the caller is not an
    /// administrator.
    pub async fn all_orders(&self, admin: &Identity) -> Result<Vec<Order>, DepotError> {
        admin.require_admin()?;
        Ok(self.store.orders().await)
    }

    /// Returns every top-up request, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::Forbidden`] if the caller is not an
    /// administrator.
    pub async fn all_top_ups(&self, admin: &Identity) -> Result<Vec<TopUpRequest>, DepotError> {
        admin.require_admin()?;
        Ok(self.store.top_ups().await)
    }

    /// Looks up orders by game player id for public order tracking.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::InvalidRequest`] for a blank player id.
    pub async fn orders_for_player(&self, player_id: &str) -> Result<Vec<Order>, DepotError> {
        let player_id = player_id.trim();
        if player_id.is_empty() {
            return Err(DepotError::InvalidRequest(
                "player id must not be empty".to_string(),
            ));
        }
        Ok(self.store.orders_for_player(player_id).await)
    }
}

/// Result of an order status transaction.
#[derive(Debug)]
struct StatusChange {
    order: Order,
    previous_status: OrderStatus,
    /// Refunded amount and the balance after crediting it.
    refund: Option<(Amount, Amount)>,
}

//! Admin analytics over the whole store.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::report::{self, CustomerSummary, OrderStatusCounts, RevenueReport};
use crate::domain::Identity;
use crate::error::DepotError;
use crate::store::DocumentStore;

/// Computes revenue, order and customer reports for administrators.
#[derive(Debug, Clone)]
pub struct ReportService {
    store: Arc<DocumentStore>,
}

impl ReportService {
    /// Creates a new `ReportService`.
    #[must_use]
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Revenue from completed orders as of now.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::Forbidden`] if the caller is not an
    /// administrator.
    pub async fn revenue(&self, admin: &Identity) -> Result<RevenueReport, DepotError> {
        admin.require_admin()?;
        let orders = self.store.orders().await;
        Ok(report::revenue_report(&orders, Utc::now()))
    }

    /// Number of orders per status.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::Forbidden`] if the caller is not an
    /// administrator.
    pub async fn order_counts(&self, admin: &Identity) -> Result<OrderStatusCounts, DepotError> {
        admin.require_admin()?;
        Ok(OrderStatusCounts::tally(&self.store.orders().await))
    }

    /// One row per known customer, optionally filtered by email.
    ///
    /// # Errors
    ///
    /// Returns [`DepotError::Forbidden`] if the caller is not an
    /// administrator.
    pub async fn customers(
        &self,
        admin: &Identity,
        search: Option<&str>,
    ) -> Result<Vec<CustomerSummary>, DepotError> {
        admin.require_admin()?;
        let wallets = self.store.wallets().await;
        let orders = self.store.orders().await;
        let top_ups = self.store.top_ups().await;
        let rows = report::customer_summaries(&wallets, &orders, &top_ups);
        Ok(match search {
            Some(term) => report::search_customers(rows, term),
            None => rows,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Amount, EventBus, PaymentMethod, ReviewDecision};
    use crate::service::{LedgerPolicy, LedgerService};

    #[tokio::test]
    async fn reports_reflect_ledger_activity() {
        let store = Arc::new(DocumentStore::new(5));
        let ledger = LedgerService::new(
            Arc::clone(&store),
            EventBus::new(16),
            LedgerPolicy::default(),
        );
        let reports = ReportService::new(Arc::clone(&store));
        let admin = Identity::admin("admin", "ops@example.com");
        let customer = Identity::customer("c1", "Buyer@Example.com");

        let Ok(top_up) = ledger
            .submit_top_up(&customer, Amount::new(5000), PaymentMethod::Nagad, "NGD-123")
            .await
        else {
            panic!("submit failed");
        };
        let Ok(_) = ledger
            .review_top_up(&admin, top_up.id, ReviewDecision::Approve)
            .await
        else {
            panic!("approve failed");
        };

        let Ok(customers) = reports.customers(&admin, Some("buyer@")).await else {
            panic!("customers failed");
        };
        let Some(row) = customers.first() else {
            panic!("customer missing");
        };
        assert_eq!(row.balance, Amount::new(5000));
        assert_eq!(row.order_count, 0);

        let Ok(revenue) = reports.revenue(&admin).await else {
            panic!("revenue failed");
        };
        assert_eq!(revenue.total, Amount::ZERO);
        assert_eq!(revenue.by_day.len(), 7);

        let Ok(counts) = reports.order_counts(&admin).await else {
            panic!("counts failed");
        };
        assert_eq!(counts, OrderStatusCounts::default());
    }

    #[tokio::test]
    async fn reports_are_admin_only() {
        let reports = ReportService::new(Arc::new(DocumentStore::new(5)));
        let customer = Identity::customer("c1", "c@example.com");
        assert!(reports.revenue(&customer).await.is_err());
        assert!(reports.order_counts(&customer).await.is_err());
        assert!(reports.customers(&customer, None).await.is_err());
    }
}

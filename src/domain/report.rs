//! Admin analytics computed from order, wallet and top-up snapshots.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{Amount, Order, OrderStatus, TopUpRequest, UserId, Wallet};

/// Number of days in the revenue chart.
pub const CHART_DAYS: i64 = 7;

/// Revenue earned on one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DailyRevenue {
    /// Calendar day (UTC).
    pub date: NaiveDate,
    /// Completed-order revenue for the day.
    pub revenue: Amount,
}

/// Completed-order revenue over standard windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RevenueReport {
    /// All-time revenue.
    pub total: Amount,
    /// Revenue since UTC midnight today.
    pub today: Amount,
    /// Revenue since midnight seven days ago.
    pub last_7_days: Amount,
    /// Revenue since midnight thirty days ago.
    pub last_30_days: Amount,
    /// Per-day revenue for the last seven days including today, oldest
    /// first.
    pub by_day: Vec<DailyRevenue>,
}

/// Builds the revenue report relative to `now`. Only `Completed` orders
/// count as revenue.
#[must_use]
pub fn revenue_report(orders: &[Order], now: DateTime<Utc>) -> RevenueReport {
    let today = now.date_naive();
    let today_start = start_of(today);
    let week_start = today_start - Duration::days(7);
    let month_start = today_start - Duration::days(30);

    let completed: Vec<&Order> = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .collect();

    let since = |from: DateTime<Utc>| -> Amount {
        completed
            .iter()
            .filter(|o| o.created_at >= from)
            .map(|o| o.product_price)
            .sum()
    };

    let by_day = (0..CHART_DAYS)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let revenue = completed
                .iter()
                .filter(|o| o.created_at.date_naive() == date)
                .map(|o| o.product_price)
                .sum();
            DailyRevenue { date, revenue }
        })
        .collect();

    RevenueReport {
        total: completed.iter().map(|o| o.product_price).sum(),
        today: since(today_start),
        last_7_days: since(week_start),
        last_30_days: since(month_start),
        by_day,
    }
}

fn start_of(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Order totals per status, as shown on the admin orders tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderStatusCounts {
    /// Orders awaiting delivery.
    pub pending: usize,
    /// Delivered orders.
    pub completed: usize,
    /// Failed (refunded) orders.
    pub failed: usize,
}

impl OrderStatusCounts {
    /// Tallies `orders` by status.
    #[must_use]
    pub fn tally<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        orders.into_iter().fold(Self::default(), |mut acc, o| {
            match o.status {
                OrderStatus::Pending => acc.pending += 1,
                OrderStatus::Completed => acc.completed += 1,
                OrderStatus::Failed => acc.failed += 1,
            }
            acc
        })
    }
}

/// One row of the admin customer table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CustomerSummary {
    /// Customer id.
    pub user_id: UserId,
    /// Most recently seen email; empty if the user never ordered or
    /// requested a top-up.
    pub email: String,
    /// Current wallet balance.
    pub balance: Amount,
    /// Number of orders placed.
    pub order_count: usize,
    /// Sum of completed order prices.
    pub total_spent: Amount,
}

/// Joins wallets, orders and top-ups into one row per known user, sorted by
/// user id.
#[must_use]
pub fn customer_summaries(
    wallets: &[(UserId, Wallet)],
    orders: &[Order],
    top_ups: &[TopUpRequest],
) -> Vec<CustomerSummary> {
    let mut rows = CustomerRows::new();

    for (user_id, wallet) in wallets {
        let (row, _) = customer_row(&mut rows, user_id);
        row.balance = wallet.balance;
    }
    for order in orders {
        let row = note_email(&mut rows, &order.user_id, &order.user_email, order.created_at);
        row.order_count += 1;
        if order.status == OrderStatus::Completed {
            row.total_spent = row.total_spent.saturating_add(order.product_price);
        }
    }
    for top_up in top_ups {
        note_email(&mut rows, &top_up.user_id, &top_up.user_email, top_up.created_at);
    }

    rows.into_values().map(|(row, _)| row).collect()
}

type CustomerRows = BTreeMap<UserId, (CustomerSummary, DateTime<Utc>)>;

fn customer_row<'a>(
    rows: &'a mut CustomerRows,
    user_id: &UserId,
) -> &'a mut (CustomerSummary, DateTime<Utc>) {
    rows.entry(user_id.clone()).or_insert_with(|| {
        (
            CustomerSummary {
                user_id: user_id.clone(),
                email: String::new(),
                balance: Amount::ZERO,
                order_count: 0,
                total_spent: Amount::ZERO,
            },
            DateTime::<Utc>::MIN_UTC,
        )
    })
}

/// Records `email` for the user if it is the most recent one seen.
fn note_email<'a>(
    rows: &'a mut CustomerRows,
    user_id: &UserId,
    email: &str,
    seen_at: DateTime<Utc>,
) -> &'a mut CustomerSummary {
    let (row, last_seen) = customer_row(rows, user_id);
    if !email.is_empty() && seen_at >= *last_seen {
        row.email = email.to_string();
        *last_seen = seen_at;
    }
    row
}

/// Keeps customers whose email contains `term`, case-insensitively.
#[must_use]
pub fn search_customers(rows: Vec<CustomerSummary>, term: &str) -> Vec<CustomerSummary> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|c| c.email.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Game, Identity, PaymentMethod, Product, ProductId};

    fn order(user: &str, price: u64, status: OrderStatus, at: DateTime<Utc>) -> Order {
        let product = Product {
            id: ProductId::new(),
            name: "Pack".to_string(),
            price: Amount::new(price),
            game: Game::FreeFire,
        };
        let mut o = Order::place(
            &Identity::customer(user, format!("{user}@x.io")),
            &product,
            "12345",
            at,
        );
        o.status = status;
        o
    }

    fn fixed_now() -> DateTime<Utc> {
        let Some(date) = NaiveDate::from_ymd_opt(2026, 3, 15) else {
            panic!("valid date");
        };
        let Some(t) = date.and_hms_opt(12, 0, 0) else {
            panic!("valid time");
        };
        t.and_utc()
    }

    #[test]
    fn revenue_counts_only_completed_orders_in_windows() {
        let now = fixed_now();
        let orders = vec![
            order("a", 50, OrderStatus::Completed, now - Duration::hours(1)),
            order("a", 100, OrderStatus::Completed, now - Duration::days(3)),
            order("b", 240, OrderStatus::Completed, now - Duration::days(20)),
            order("b", 480, OrderStatus::Completed, now - Duration::days(90)),
            order("b", 950, OrderStatus::Pending, now),
            order("c", 2300, OrderStatus::Failed, now),
        ];

        let report = revenue_report(&orders, now);
        assert_eq!(report.total, Amount::new(870));
        assert_eq!(report.today, Amount::new(50));
        assert_eq!(report.last_7_days, Amount::new(150));
        assert_eq!(report.last_30_days, Amount::new(390));
    }

    #[test]
    fn chart_has_seven_days_oldest_first() {
        let now = fixed_now();
        let orders = vec![
            order("a", 50, OrderStatus::Completed, now),
            order("a", 70, OrderStatus::Completed, now - Duration::days(6)),
        ];
        let report = revenue_report(&orders, now);
        assert_eq!(report.by_day.len(), 7);
        let Some(first) = report.by_day.first() else {
            panic!("chart is empty");
        };
        let Some(last) = report.by_day.last() else {
            panic!("chart is empty");
        };
        assert_eq!(first.date, now.date_naive() - Duration::days(6));
        assert_eq!(first.revenue, Amount::new(70));
        assert_eq!(last.date, now.date_naive());
        assert_eq!(last.revenue, Amount::new(50));
    }

    #[test]
    fn status_counts_tally() {
        let now = fixed_now();
        let orders = [
            order("a", 1, OrderStatus::Pending, now),
            order("a", 1, OrderStatus::Pending, now),
            order("a", 1, OrderStatus::Failed, now),
        ];
        let counts = OrderStatusCounts::tally(&orders);
        assert_eq!(
            counts,
            OrderStatusCounts {
                pending: 2,
                completed: 0,
                failed: 1
            }
        );
    }

    #[test]
    fn customers_join_all_sources() {
        let now = fixed_now();
        let wallets = vec![
            (UserId::new("a"), Wallet::with_balance(Amount::new(10))),
            (UserId::new("silent"), Wallet::with_balance(Amount::new(5))),
        ];
        let orders = vec![
            order("a", 50, OrderStatus::Completed, now),
            order("a", 30, OrderStatus::Pending, now),
        ];
        let top_ups = vec![TopUpRequest::submit(
            &Identity::customer("t", "t@x.io"),
            Amount::new(1000),
            PaymentMethod::Nagad,
            "REF01",
            now,
        )];

        let rows = customer_summaries(&wallets, &orders, &top_ups);
        assert_eq!(rows.len(), 3);

        let Some(a) = rows.iter().find(|r| r.user_id.as_str() == "a") else {
            panic!("customer a missing");
        };
        assert_eq!(a.email, "a@x.io");
        assert_eq!(a.balance, Amount::new(10));
        assert_eq!(a.order_count, 2);
        assert_eq!(a.total_spent, Amount::new(50));

        let Some(silent) = rows.iter().find(|r| r.user_id.as_str() == "silent") else {
            panic!("wallet-only customer missing");
        };
        assert!(silent.email.is_empty());

        let Some(t) = rows.iter().find(|r| r.user_id.as_str() == "t") else {
            panic!("top-up-only customer missing");
        };
        assert_eq!(t.balance, Amount::ZERO);
        assert_eq!(t.email, "t@x.io");
    }

    #[test]
    fn search_is_case_insensitive() {
        let now = fixed_now();
        let rows = customer_summaries(&[], &[order("Alice", 1, OrderStatus::Pending, now)], &[]);
        assert_eq!(search_customers(rows.clone(), "ALICE").len(), 1);
        assert_eq!(search_customers(rows.clone(), "bob").len(), 0);
        assert_eq!(search_customers(rows, "  ").len(), 1);
    }
}

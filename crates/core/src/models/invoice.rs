//! Invoices.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::{Order, OrderItem};
use crate::entity::Table;
use crate::impl_entity;
use crate::types::{InvoiceId, InvoiceStatus, OrderId, UserId};

/// Days between invoice creation and its due date.
pub const DEFAULT_DUE_DAYS: u64 = 7;

/// A persisted invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub user_id: UserId,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    pub invoice_number: String,
    pub amount: Decimal,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl_entity!(Invoice, Table::Invoices);

impl Invoice {
    /// A pending invoice whose due date has passed.
    #[must_use]
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Pending && self.due_date < today
    }
}

/// Insert payload for an invoice.
#[derive(Debug, Clone, Serialize)]
pub struct NewInvoice {
    pub user_id: UserId,
    pub order_id: Option<OrderId>,
    pub invoice_number: String,
    pub amount: Decimal,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub items: Vec<OrderItem>,
}

impl NewInvoice {
    /// Bill an order: same owner, amount and items, due in
    /// [`DEFAULT_DUE_DAYS`] days.
    #[must_use]
    pub fn for_order(order: &Order, today: NaiveDate) -> Self {
        Self {
            user_id: order.user_id,
            order_id: Some(order.id),
            invoice_number: generate_invoice_number(today),
            amount: order.total_amount,
            status: InvoiceStatus::Pending,
            due_date: today
                .checked_add_days(Days::new(DEFAULT_DUE_DAYS))
                .unwrap_or(today),
            items: order.items.clone(),
        }
    }
}

/// Generate an invoice number: `INV-<yyyymmdd>-<4 digits>`.
#[must_use]
pub fn generate_invoice_number(today: NaiveDate) -> String {
    let serial: u16 = rand::rng().random_range(1000..10_000);
    format!("INV-{}-{serial}", today.format("%Y%m%d"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::OrderStatus;

    fn sample_order() -> Order {
        Order {
            id: OrderId::generate(),
            user_id: UserId::generate(),
            order_number: "ORD-1-ABCDE".to_string(),
            total_amount: Decimal::from(45_000),
            status: OrderStatus::Pending,
            items: vec![],
            payment_method: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_invoice_for_order_copies_amount_and_sets_due_date() {
        let order = sample_order();
        let today = NaiveDate::from_ymd_opt(2025, 1, 28).unwrap();
        let invoice = NewInvoice::for_order(&order, today);
        assert_eq!(invoice.amount, order.total_amount);
        assert_eq!(invoice.order_id, Some(order.id));
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2025, 2, 4).unwrap());
        assert!(invoice.invoice_number.starts_with("INV-20250128-"));
    }

    #[test]
    fn test_is_past_due_only_for_pending() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let mut invoice = Invoice {
            id: InvoiceId::generate(),
            user_id: UserId::generate(),
            order_id: None,
            invoice_number: "INV-1".to_string(),
            amount: Decimal::from(1_000),
            status: InvoiceStatus::Pending,
            due_date: NaiveDate::from_ymd_opt(2025, 5, 9).unwrap(),
            items: vec![],
            paid_at: None,
            created_at: Utc::now(),
        };
        assert!(invoice.is_past_due(today));
        invoice.status = InvoiceStatus::Paid;
        assert!(!invoice.is_past_due(today));
        invoice.status = InvoiceStatus::Pending;
        invoice.due_date = today;
        assert!(!invoice.is_past_due(today));
    }
}

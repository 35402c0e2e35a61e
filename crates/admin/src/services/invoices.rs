//! Billing operations on top of the invoices table.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use tracing::{info, instrument};

use angohost_baas::{BaasError, Query, Repository};
use angohost_core::models::{Invoice, NewInvoice, Order};
use angohost_core::{InvoiceId, InvoiceStatus, OrderId, Table};

/// Set an invoice's status. Marking it paid stamps `paid_at` with `now`;
/// any other status clears it.
///
/// # Errors
///
/// Returns an error if the update fails or no invoice has this id.
pub async fn set_status(
    repo: &Repository<Invoice>,
    id: InvoiceId,
    status: InvoiceStatus,
    now: DateTime<Utc>,
) -> Result<Invoice, BaasError> {
    let paid_at = (status == InvoiceStatus::Paid).then_some(now);
    repo.update(id, &json!({ "status": status, "paid_at": paid_at }))
        .await
}

/// Bill an order: insert a pending invoice carrying the order's owner,
/// amount and items.
///
/// # Errors
///
/// Returns an error if the order cannot be read or the insert fails.
#[instrument(skip(orders, invoices))]
pub async fn create_for_order(
    orders: &Repository<Order>,
    invoices: &Repository<Invoice>,
    order_id: OrderId,
    today: NaiveDate,
) -> Result<Invoice, BaasError> {
    let order = orders.get(order_id).await?;
    let invoice = invoices.create(&NewInvoice::for_order(&order, today)).await?;
    info!(
        order_number = %order.order_number,
        invoice_number = %invoice.invoice_number,
        "Invoice created for order"
    );
    Ok(invoice)
}

/// Mark every pending invoice due before `today` as overdue; returns how
/// many changed.
///
/// # Errors
///
/// Returns an error if the update fails.
#[instrument(skip(repo))]
pub async fn sweep_overdue(repo: &Repository<Invoice>, today: NaiveDate) -> Result<usize, BaasError> {
    let query = Query::table(Table::Invoices)
        .eq("status", InvoiceStatus::Pending)
        .lt("due_date", today);
    let changed = repo
        .update_where(query, &json!({ "status": InvoiceStatus::Overdue }))
        .await?;
    info!(count = changed.len(), "Overdue invoices swept");
    Ok(changed.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use angohost_baas::{Baas, MemoryBaas};
    use angohost_core::UserId;
    use chrono::TimeZone;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    async fn seeded() -> (Arc<MemoryBaas>, Repository<Invoice>) {
        let baas = Arc::new(MemoryBaas::new());
        let user = UserId::generate();
        baas.seed(
            Table::Invoices,
            [
                json!({"user_id": user, "invoice_number": "INV-1", "amount": "100", "status": "pending", "due_date": "2026-03-01"}),
                json!({"user_id": user, "invoice_number": "INV-2", "amount": "100", "status": "pending", "due_date": "2026-03-20"}),
                json!({"user_id": user, "invoice_number": "INV-3", "amount": "100", "status": "paid", "due_date": "2026-02-01"}),
            ],
        )
        .await;
        let repo = Repository::new(baas.clone() as Arc<dyn Baas>);
        (baas, repo)
    }

    #[tokio::test]
    async fn test_sweep_overdue_only_touches_past_due_pending() {
        let (_baas, repo) = seeded().await;
        assert_eq!(sweep_overdue(&repo, day(10)).await.unwrap(), 1);

        let invoices = repo.list().await.unwrap();
        let status_of = |n: &str| {
            invoices
                .iter()
                .find(|i| i.invoice_number == n)
                .map(|i| i.status)
                .unwrap()
        };
        assert_eq!(status_of("INV-1"), InvoiceStatus::Overdue);
        assert_eq!(status_of("INV-2"), InvoiceStatus::Pending);
        assert_eq!(status_of("INV-3"), InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn test_mark_paid_stamps_paid_at() {
        let (_baas, repo) = seeded().await;
        let id = repo.list().await.unwrap()[0].id;
        let now = Utc.with_ymd_and_hms(2026, 3, 5, 9, 30, 0).unwrap();

        let paid = set_status(&repo, id, InvoiceStatus::Paid, now).await.unwrap();
        assert_eq!(paid.paid_at, Some(now));

        let reopened = set_status(&repo, id, InvoiceStatus::Pending, now)
            .await
            .unwrap();
        assert_eq!(reopened.paid_at, None);
    }

    #[tokio::test]
    async fn test_create_for_order() {
        let baas: Arc<dyn Baas> = Arc::new(MemoryBaas::new());
        let orders = Repository::<Order>::new(Arc::clone(&baas));
        let invoices = Repository::<Invoice>::new(baas);
        let order = orders
            .create(&json!({
                "user_id": UserId::generate(),
                "order_number": "ORD-1",
                "total_amount": "19900",
                "status": "pending",
                "items": []
            }))
            .await
            .unwrap();

        let invoice = create_for_order(&orders, &invoices, order.id, day(1))
            .await
            .unwrap();
        assert_eq!(invoice.order_id, Some(order.id));
        assert_eq!(invoice.amount, order.total_amount);
        assert_eq!(invoice.due_date, day(8));
        assert_eq!(invoice.status, InvoiceStatus::Pending);
    }
}

//! Invoice maintenance commands.

use std::sync::Arc;

use angohost_admin::services::invoices;
use angohost_baas::{Baas, Repository};
use angohost_core::models::Invoice;
use chrono::Utc;

use super::CommandError;

/// Mark every pending invoice whose due date has passed as overdue.
///
/// # Errors
///
/// Returns an error if the BaaS update fails.
pub async fn sweep_overdue(baas: Arc<dyn Baas>) -> Result<usize, CommandError> {
    let repo = Repository::<Invoice>::new(baas);
    let today = Utc::now().date_naive();
    let count = invoices::sweep_overdue(&repo, today).await?;
    tracing::info!("{count} invoice(s) marked overdue");
    Ok(count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use angohost_baas::MemoryBaas;
    use angohost_core::{Table, UserId};
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_sweep_overdue_only_touches_past_due() {
        let baas = Arc::new(MemoryBaas::new());
        baas.seed(
            Table::Invoices,
            [
                json!({"user_id": UserId::generate(), "invoice_number": "FT 2025/0001", "amount": "5000", "status": "pending", "due_date": "2025-01-01", "items": []}),
                json!({"user_id": UserId::generate(), "invoice_number": "FT 2099/0001", "amount": "5000", "status": "pending", "due_date": "2099-01-01", "items": []}),
                json!({"user_id": UserId::generate(), "invoice_number": "FT 2025/0002", "amount": "5000", "status": "paid", "due_date": "2025-01-01", "items": []}),
            ],
        )
        .await;

        let count = sweep_overdue(Arc::clone(&baas) as Arc<dyn Baas>).await.unwrap();
        assert_eq!(count, 1);

        let statuses: Vec<_> = baas
            .rows(Table::Invoices)
            .await
            .into_iter()
            .map(|row| row["status"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(statuses, ["overdue", "pending", "paid"]);
    }
}

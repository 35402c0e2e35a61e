//! Invoice management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use angohost_baas::{Repository, ResourceView};
use angohost_core::models::Invoice;
use angohost_core::{InvoiceId, InvoiceStatus, Notice};

use crate::components::{DataTableConfig, TableColumn, TableFilter};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::{CurrentStaff, Section};
use crate::page::AdminPage;
use crate::services::invoices;
use crate::state::AppState;

use super::{ListParams, settle};

/// Invoice status form.
#[derive(Debug, Deserialize)]
pub struct InvoiceStatusForm {
    pub status: InvoiceStatus,
}

/// Invoices list template.
#[derive(Template, WebTemplate)]
#[template(path = "invoices/index.html")]
pub struct InvoicesTemplate {
    pub page: AdminPage,
    pub table: DataTableConfig,
    pub invoices: Vec<Invoice>,
    pub statuses: &'static [InvoiceStatus],
}

fn table_config(status: Option<InvoiceStatus>) -> DataTableConfig {
    DataTableConfig::new("invoices")
        .column(TableColumn::new("invoice_number", "Invoice"))
        .column(TableColumn::new("created_at", "Issued"))
        .column(TableColumn::new("due_date", "Due"))
        .column(TableColumn::new("paid_at", "Paid"))
        .column(TableColumn::numeric("amount", "Amount"))
        .column(TableColumn::new("status", "Status"))
        .filter(TableFilter::select(
            "status",
            "Status",
            InvoiceStatus::ALL.iter().map(|s| s.as_str()),
        ))
        .with_selection("status", status.map(InvoiceStatus::as_str))
        .empty_state("No invoices", None)
}

fn view(state: &AppState, status: Option<InvoiceStatus>) -> ResourceView<Invoice> {
    let query = match status {
        Some(status) => Repository::<Invoice>::query().eq("status", status),
        None => Repository::<Invoice>::query(),
    };
    ResourceView::with_query(state.repo::<Invoice>(), query)
}

async fn render(
    staff: &CurrentStaff,
    view: ResourceView<Invoice>,
    status: Option<InvoiceStatus>,
    notice: Option<Notice>,
) -> InvoicesTemplate {
    let (invoices, view_notice) = settle(view).await;
    InvoicesTemplate {
        page: AdminPage::new(staff, Section::Invoices)
            .with_notice(notice)
            .with_notice(view_notice),
        table: table_config(status),
        invoices,
        statuses: InvoiceStatus::ALL,
    }
}

/// List invoices.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireStaff,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Invoices)?;
    let status = params.status();
    Ok(render(staff, view(&state, status), status, None).await)
}

/// Change an invoice's status; marking it paid records the payment time.
#[instrument(skip_all, fields(invoice = %id))]
pub async fn set_status(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<InvoiceId>,
    Form(form): Form<InvoiceStatusForm>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Invoices)?;
    let mut view = view(&state, None);
    let status = form.status;
    view.mutate(&format!("Invoice marked {status}"), |repo| async move {
        invoices::set_status(&repo, id, status, Utc::now()).await
    })
    .await;
    Ok(render(staff, view, None, None).await)
}

/// Mark every pending invoice past its due date as overdue.
#[instrument(skip_all)]
pub async fn sweep_overdue(
    State(state): State<AppState>,
    auth: RequireStaff,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Invoices)?;
    let today = Utc::now().date_naive();
    let notice = match invoices::sweep_overdue(&state.repo::<Invoice>(), today).await {
        Ok(count) => Notice::success(format!("{count} invoice(s) marked overdue")),
        Err(e) => Notice::error(e.to_string()),
    };
    Ok(render(staff, view(&state, None), None, Some(notice)).await)
}

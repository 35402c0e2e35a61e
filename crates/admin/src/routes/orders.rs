//! Order management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use angohost_baas::{Repository, ResourceView};
use angohost_core::models::{Invoice, Order};
use angohost_core::{Notice, OrderId, OrderStatus};

use crate::components::{DataTableConfig, TableColumn, TableFilter};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::{CurrentStaff, Section};
use crate::page::AdminPage;
use crate::services::invoices;
use crate::state::AppState;

use super::{ListParams, settle};

/// Order status form.
#[derive(Debug, Deserialize)]
pub struct OrderStatusForm {
    pub status: OrderStatus,
}

/// Orders list template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub page: AdminPage,
    pub table: DataTableConfig,
    pub orders: Vec<Order>,
    pub statuses: &'static [OrderStatus],
    /// Whether the "Invoice" action is shown.
    pub can_invoice: bool,
}

fn table_config(status: Option<OrderStatus>) -> DataTableConfig {
    DataTableConfig::new("orders")
        .column(TableColumn::new("order_number", "Order"))
        .column(TableColumn::new("created_at", "Placed"))
        .column(TableColumn::new("items", "Items"))
        .column(TableColumn::new("payment_method", "Payment"))
        .column(TableColumn::numeric("total_amount", "Total"))
        .column(TableColumn::new("status", "Status"))
        .filter(TableFilter::select(
            "status",
            "Status",
            OrderStatus::ALL.iter().map(|s| s.as_str()),
        ))
        .with_selection("status", status.map(OrderStatus::as_str))
        .empty_state(
            "No orders yet",
            Some("Orders placed on the storefront appear here."),
        )
}

fn view(state: &AppState, status: Option<OrderStatus>) -> ResourceView<Order> {
    let query = match status {
        Some(status) => Repository::<Order>::query().eq("status", status),
        None => Repository::<Order>::query(),
    };
    ResourceView::with_query(state.repo::<Order>(), query)
}

async fn render(
    staff: &CurrentStaff,
    view: ResourceView<Order>,
    status: Option<OrderStatus>,
    notice: Option<Notice>,
) -> OrdersTemplate {
    let (orders, view_notice) = settle(view).await;
    OrdersTemplate {
        page: AdminPage::new(staff, Section::Orders)
            .with_notice(notice)
            .with_notice(view_notice),
        table: table_config(status),
        orders,
        statuses: OrderStatus::ALL,
        can_invoice: staff.can(Section::Invoices),
    }
}

/// List orders.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireStaff,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Orders)?;
    let status = params.status();
    Ok(render(staff, view(&state, status), status, None).await)
}

/// Change an order's status. Any transition is allowed.
#[instrument(skip_all, fields(order = %id))]
pub async fn set_status(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<OrderId>,
    Form(form): Form<OrderStatusForm>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Orders)?;
    let mut view = view(&state, None);
    let status = form.status;
    view.mutate(&format!("Order marked {status}"), |repo| async move {
        repo.update(id, &json!({ "status": status })).await
    })
    .await;
    Ok(render(staff, view, None, None).await)
}

/// Create a pending invoice for an order.
#[instrument(skip_all, fields(order = %id))]
pub async fn create_invoice(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    auth.authorize(Section::Invoices)?;
    let staff = auth.authorize(Section::Orders)?;

    let today = Utc::now().date_naive();
    let notice = match invoices::create_for_order(
        &state.repo::<Order>(),
        &state.repo::<Invoice>(),
        id,
        today,
    )
    .await
    {
        Ok(invoice) => Notice::success(format!("Invoice {} created", invoice.invoice_number)),
        Err(e) => Notice::error(e.to_string()),
    };
    Ok(render(staff, view(&state, None), None, Some(notice)).await)
}

//! Dashboard route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use chrono::{Days, Utc};
use tracing::{instrument, warn};

use angohost_baas::{Query, Repository};
use angohost_core::models::Order;
use angohost_core::{
    DomainStatus, InvoiceStatus, Notice, OrderStatus, ServiceStatus, Table, TicketStatus, UserRole,
};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::Section;
use crate::page::AdminPage;
use crate::state::AppState;

/// Domains expiring within this many days are counted as expiring soon.
pub const EXPIRY_WINDOW_DAYS: u64 = 30;

const RECENT_ORDERS: usize = 5;

/// Figures shown on the dashboard. `None` means the signed-in role does not
/// see that section, or the count could not be loaded.
#[derive(Debug, Clone, Default)]
pub struct DashboardStats {
    pub customers: Option<usize>,
    pub pending_orders: Option<usize>,
    pub unpaid_invoices: Option<usize>,
    pub active_services: Option<usize>,
    pub expiring_domains: Option<usize>,
    pub open_tickets: Option<usize>,
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: AdminPage,
    pub stats: DashboardStats,
    pub recent_orders: Vec<Order>,
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "ok"
}

/// Count rows matching `query`, noting a failure once.
async fn count(state: &AppState, query: Query, failed: &mut bool) -> Option<usize> {
    match state.baas().select(&query).await {
        Ok(rows) => Some(rows.len()),
        Err(e) => {
            warn!(table = %query.table, error = %e, "Dashboard count failed");
            *failed = true;
            None
        }
    }
}

/// Display the dashboard.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, auth: RequireStaff) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Dashboard)?;
    let today = Utc::now().date_naive();
    let mut stats = DashboardStats::default();
    let mut failed = false;

    if staff.can(Section::Users) {
        let query = Query::table(Table::Profiles).eq("role", UserRole::Customer);
        stats.customers = count(&state, query, &mut failed).await;
    }
    if staff.can(Section::Orders) {
        let query = Query::table(Table::Orders).eq("status", OrderStatus::Pending);
        stats.pending_orders = count(&state, query, &mut failed).await;
    }
    if staff.can(Section::Invoices) {
        let query = Query::table(Table::Invoices)
            .in_list("status", &[InvoiceStatus::Pending, InvoiceStatus::Overdue]);
        stats.unpaid_invoices = count(&state, query, &mut failed).await;
    }
    if staff.can(Section::Services) {
        let query = Query::table(Table::Services).eq("status", ServiceStatus::Active);
        stats.active_services = count(&state, query, &mut failed).await;
    }
    if staff.can(Section::Domains) {
        let horizon = today
            .checked_add_days(Days::new(EXPIRY_WINDOW_DAYS))
            .unwrap_or(today);
        let query = Query::table(Table::Domains)
            .eq("status", DomainStatus::Active)
            .lt("expiry_date", horizon);
        stats.expiring_domains = count(&state, query, &mut failed).await;
    }
    if staff.can(Section::Tickets) {
        let query = Query::table(Table::Tickets)
            .in_list("status", &[TicketStatus::Open, TicketStatus::InProgress]);
        stats.open_tickets = count(&state, query, &mut failed).await;
    }

    let recent_orders = if staff.can(Section::Orders) {
        let query = Repository::<Order>::query().limit(RECENT_ORDERS);
        state
            .repo::<Order>()
            .list_where(query)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load recent orders");
                failed = true;
                Vec::new()
            })
    } else {
        Vec::new()
    };

    let notice = failed.then(|| Notice::error("Some figures could not be loaded"));
    Ok(DashboardTemplate {
        page: AdminPage::new(staff, Section::Dashboard).with_notice(notice),
        stats,
        recent_orders,
    })
}

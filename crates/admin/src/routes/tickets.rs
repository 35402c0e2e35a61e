//! Support ticket route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{instrument, warn};

use angohost_baas::{Repository, ResourceView};
use angohost_core::models::{Profile, Ticket};
use angohost_core::{Notice, TicketId, TicketStatus, UserId, UserRole};

use crate::components::{DataTableConfig, TableColumn, TableFilter};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::{CurrentStaff, Section};
use crate::page::AdminPage;
use crate::state::AppState;

use super::{ListParams, non_empty, settle};

/// Ticket status form.
#[derive(Debug, Deserialize)]
pub struct TicketStatusForm {
    pub status: TicketStatus,
}

/// Assignment form. A blank value unassigns the ticket.
#[derive(Debug, Deserialize)]
pub struct AssignForm {
    #[serde(default)]
    pub assigned_to: Option<String>,
}

impl AssignForm {
    /// The chosen staff member, `None` to unassign.
    ///
    /// # Errors
    ///
    /// Returns a message if the value is not a user id.
    pub fn assignee(&self) -> std::result::Result<Option<UserId>, String> {
        non_empty(self.assigned_to.clone())
            .map(|v| v.parse().map_err(|_| "Unknown staff member".to_string()))
            .transpose()
    }
}

/// Someone a ticket can be assigned to.
#[derive(Debug, Clone)]
pub struct StaffOption {
    pub id: String,
    pub name: String,
}

/// Ticket row for templates.
#[derive(Debug, Clone)]
pub struct TicketRow {
    pub ticket: Ticket,
    /// Assignee id as text, empty when unassigned.
    pub assignee_id: String,
    /// Assignee name, or a dash.
    pub assignee: String,
}

/// Tickets list template.
#[derive(Template, WebTemplate)]
#[template(path = "tickets/index.html")]
pub struct TicketsTemplate {
    pub page: AdminPage,
    pub table: DataTableConfig,
    pub rows: Vec<TicketRow>,
    pub statuses: &'static [TicketStatus],
    pub staff_members: Vec<StaffOption>,
}

fn rows(tickets: Vec<Ticket>, staff_members: &[StaffOption]) -> Vec<TicketRow> {
    tickets
        .into_iter()
        .map(|ticket| {
            let assignee_id = ticket
                .assigned_to
                .map(|id| id.to_string())
                .unwrap_or_default();
            let assignee = staff_members
                .iter()
                .find(|m| !assignee_id.is_empty() && m.id == assignee_id)
                .map_or_else(
                    || {
                        if assignee_id.is_empty() {
                            "-".to_string()
                        } else {
                            assignee_id.clone()
                        }
                    },
                    |m| m.name.clone(),
                );
            TicketRow {
                ticket,
                assignee_id,
                assignee,
            }
        })
        .collect()
}

fn table_config(status: Option<TicketStatus>) -> DataTableConfig {
    DataTableConfig::new("tickets")
        .column(TableColumn::new("subject", "Subject"))
        .column(TableColumn::new("created_at", "Opened"))
        .column(TableColumn::new("priority", "Priority"))
        .column(TableColumn::new("assigned_to", "Assignee"))
        .column(TableColumn::new("status", "Status"))
        .filter(TableFilter::select(
            "status",
            "Status",
            TicketStatus::ALL.iter().map(|s| s.as_str()),
        ))
        .with_selection("status", status.map(TicketStatus::as_str))
        .empty_state("No tickets", Some("Nothing waiting on support."))
}

fn view(state: &AppState, status: Option<TicketStatus>) -> ResourceView<Ticket> {
    let query = match status {
        Some(status) => Repository::<Ticket>::query().eq("status", status),
        None => Repository::<Ticket>::query(),
    };
    ResourceView::with_query(state.repo::<Ticket>(), query)
}

async fn render(
    state: &AppState,
    staff: &CurrentStaff,
    view: ResourceView<Ticket>,
    status: Option<TicketStatus>,
    notice: Option<Notice>,
) -> TicketsTemplate {
    let (tickets, view_notice) = settle(view).await;
    let query = Repository::<Profile>::query().neq("role", UserRole::Customer);
    let staff_members = state
        .repo::<Profile>()
        .list_where(query)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load staff for assignment");
            Vec::new()
        })
        .into_iter()
        .map(|p| StaffOption {
            id: p.id.to_string(),
            name: p.display_name().to_string(),
        })
        .collect::<Vec<_>>();

    TicketsTemplate {
        page: AdminPage::new(staff, Section::Tickets)
            .with_notice(notice)
            .with_notice(view_notice),
        table: table_config(status),
        rows: rows(tickets, &staff_members),
        statuses: TicketStatus::ALL,
        staff_members,
    }
}

/// List tickets.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireStaff,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Tickets)?;
    let status = params.status();
    Ok(render(&state, staff, view(&state, status), status, None).await)
}

/// Change a ticket's status.
#[instrument(skip_all, fields(ticket = %id))]
pub async fn set_status(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<TicketId>,
    Form(form): Form<TicketStatusForm>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Tickets)?;
    let mut view = view(&state, None);
    let status = form.status;
    view.mutate(&format!("Ticket marked {status}"), |repo| async move {
        repo.update(id, &json!({ "status": status })).await
    })
    .await;
    Ok(render(&state, staff, view, None, None).await)
}

/// Assign a ticket to a staff member, or unassign it.
#[instrument(skip_all, fields(ticket = %id))]
pub async fn assign(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<TicketId>,
    Form(form): Form<AssignForm>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Tickets)?;
    let mut view = view(&state, None);
    let assignee = match form.assignee() {
        Ok(assignee) => assignee,
        Err(message) => {
            return Ok(render(&state, staff, view, None, Some(Notice::error(message))).await);
        }
    };

    let message = if assignee.is_some() {
        "Ticket assigned"
    } else {
        "Ticket unassigned"
    };
    view.mutate(message, |repo| async move {
        repo.update(id, &json!({ "assigned_to": assignee })).await
    })
    .await;
    Ok(render(&state, staff, view, None, None).await)
}

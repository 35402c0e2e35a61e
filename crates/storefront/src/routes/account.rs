//! Account route handlers.
//!
//! Every page here requires a signed-in customer and shows only rows whose
//! `user_id` is theirs.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use angohost_baas::Repository;
use angohost_core::models::{
    Domain, HostingService, Invoice, NewTicket, Order, Profile, ProfilePatch, Ticket,
};
use angohost_core::{Entity, Nif, Notice, TicketPriority, TicketStatus};

use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::CurrentUser;
use crate::page::PageContext;
use crate::services::notices;
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub page: PageContext,
    pub user: CurrentUser,
    /// Most recent orders only.
    pub orders: Vec<Order>,
    pub unpaid_invoices: usize,
    pub domain_count: usize,
    pub service_count: usize,
    pub open_tickets: usize,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<Order>,
}

/// Invoice list template.
#[derive(Template, WebTemplate)]
#[template(path = "account/invoices.html")]
pub struct InvoicesTemplate {
    pub page: PageContext,
    pub invoices: Vec<Invoice>,
}

/// Domain list template.
#[derive(Template, WebTemplate)]
#[template(path = "account/domains.html")]
pub struct DomainsTemplate {
    pub page: PageContext,
    pub domains: Vec<Domain>,
}

/// Service list template.
#[derive(Template, WebTemplate)]
#[template(path = "account/services.html")]
pub struct ServicesTemplate {
    pub page: PageContext,
    pub services: Vec<HostingService>,
}

/// Ticket list and new-ticket form template.
#[derive(Template, WebTemplate)]
#[template(path = "account/tickets.html")]
pub struct TicketsTemplate {
    pub page: PageContext,
    pub tickets: Vec<Ticket>,
    pub priorities: &'static [TicketPriority],
}

/// Profile form template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
    pub profile: Option<Profile>,
    pub email: String,
    pub nif_lookup: bool,
}

// =============================================================================
// Form Types
// =============================================================================

/// New ticket form data.
#[derive(Debug, Deserialize)]
pub struct TicketForm {
    pub subject: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
}

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub nif: String,
}

// =============================================================================
// Helpers
// =============================================================================

/// The user's rows of one table, newest first.
async fn own_rows<E: Entity>(state: &AppState, user: &CurrentUser) -> Result<Vec<E>> {
    Ok(Repository::<E>::new(Arc::clone(state.baas()))
        .list_for_user(user.id)
        .await?)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// =============================================================================
// Handlers
// =============================================================================

/// Display account overview page.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse> {
    let orders: Vec<Order> = own_rows(&state, &user).await?;
    let invoices: Vec<Invoice> = own_rows(&state, &user).await?;
    let domains: Vec<Domain> = own_rows(&state, &user).await?;
    let services: Vec<HostingService> = own_rows(&state, &user).await?;
    let tickets: Vec<Ticket> = own_rows(&state, &user).await?;

    Ok(AccountIndexTemplate {
        page,
        orders: orders.into_iter().take(5).collect(),
        unpaid_invoices: invoices
            .iter()
            .filter(|i| i.paid_at.is_none() && i.status != angohost_core::InvoiceStatus::Cancelled)
            .count(),
        domain_count: domains.len(),
        service_count: services.len(),
        open_tickets: tickets
            .iter()
            .filter(|t| t.status != TicketStatus::Closed)
            .count(),
        user,
    })
}

/// Display order history.
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse> {
    Ok(OrdersTemplate {
        page,
        orders: own_rows(&state, &user).await?,
    })
}

/// Display invoices.
pub async fn invoices(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse> {
    Ok(InvoicesTemplate {
        page,
        invoices: own_rows(&state, &user).await?,
    })
}

/// Display domains.
pub async fn domains(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse> {
    Ok(DomainsTemplate {
        page,
        domains: own_rows(&state, &user).await?,
    })
}

/// Display services.
pub async fn services(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse> {
    Ok(ServicesTemplate {
        page,
        services: own_rows(&state, &user).await?,
    })
}

/// Display tickets.
pub async fn tickets(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse> {
    Ok(TicketsTemplate {
        page,
        tickets: own_rows(&state, &user).await?,
        priorities: TicketPriority::ALL,
    })
}

/// Open a ticket.
#[instrument(skip(state, session, user))]
pub async fn create_ticket(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<TicketForm>,
) -> Response {
    let Some(subject) = non_empty(form.subject) else {
        notices::push(&session, Notice::error("Please enter a subject")).await;
        return Redirect::to("/account/tickets").into_response();
    };

    let ticket = NewTicket {
        user_id: user.id,
        subject,
        message: form.message.and_then(non_empty),
        status: TicketStatus::Open,
        priority: form.priority.unwrap_or_default(),
    };
    let notice = match Repository::<Ticket>::new(Arc::clone(state.baas()))
        .create(&ticket)
        .await
    {
        Ok(_) => Notice::success("Ticket opened. Our team will reply shortly."),
        Err(e) => {
            warn!(error = %e, "Failed to open ticket");
            Notice::error(e.to_string())
        }
    };
    notices::push(&session, notice).await;
    Redirect::to("/account/tickets").into_response()
}

/// Display the profile form.
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse> {
    let profile = Repository::<Profile>::new(Arc::clone(state.baas()))
        .find(user.id)
        .await?;
    Ok(ProfileTemplate {
        page,
        profile,
        email: user.email,
        nif_lookup: state.nif().is_configured(),
    })
}

/// Save the profile form.
///
/// A non-empty NIF must have a valid shape; registry verification happens
/// client-side through `/api/nif/{nif}`.
#[instrument(skip(state, session, user))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Response {
    let nif = match non_empty(form.nif) {
        Some(raw) => match Nif::parse(&raw) {
            Ok(nif) => Some(nif.to_string()),
            Err(e) => {
                notices::push(&session, Notice::error(e.to_string())).await;
                return Redirect::to("/account/profile").into_response();
            }
        },
        None => None,
    };

    let patch = ProfilePatch {
        full_name: non_empty(form.full_name),
        phone: non_empty(form.phone),
        address: non_empty(form.address),
        nif,
    };
    if patch.is_empty() {
        notices::push(&session, Notice::info("Nothing to update")).await;
        return Redirect::to("/account/profile").into_response();
    }

    let notice = match Repository::<Profile>::new(Arc::clone(state.baas()))
        .update(user.id, &patch)
        .await
    {
        Ok(profile) => {
            let refreshed = CurrentUser {
                full_name: profile.full_name,
                ..user
            };
            if let Err(e) = set_current_user(&session, &refreshed).await {
                warn!(error = %e, "Failed to refresh session user");
            }
            Notice::success("Profile updated")
        }
        Err(e) => Notice::error(e.to_string()),
    };
    notices::push(&session, notice).await;
    Redirect::to("/account/profile").into_response()
}

//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Health check
//!
//! # Auth
//! GET  /auth/login                     - Login page
//! POST /auth/login                     - Login action (staff roles only)
//! POST /auth/logout                    - Logout action
//!
//! # Dashboard
//! GET  /                               - Counts and recent orders
//! GET  /live                           - Refresh signals (event stream)
//!
//! # Users (admin)
//! GET  /users                          - Profiles, filter by role
//! POST /users/{id}/role                - Change role
//! POST /users/{id}/toggle-active       - Activate / deactivate
//! POST /users/{id}/delete              - Delete user and owned rows
//!
//! # Billing (admin, finance)
//! GET  /orders                         - Orders, filter by status
//! POST /orders/{id}/status             - Change status
//! POST /orders/{id}/invoice            - Create invoice for order
//! GET  /invoices                       - Invoices, filter by status
//! POST /invoices/{id}/status           - Change status
//! POST /invoices/sweep-overdue         - Mark past-due invoices overdue
//!
//! # Customer assets (admin, support)
//! GET  /domains                        - Domains, filter by status
//! POST /domains/{id}/status            - Change status
//! POST /domains/{id}/flag              - Flip lock / privacy / auto-renew
//! POST /domains/{id}/delete            - Delete domain
//! GET  /services                       - Services, filter by status
//! POST /services                       - Provision service
//! POST /services/{id}/status           - Change status
//! POST /services/{id}/delete           - Delete service
//! GET  /tickets                        - Tickets, filter by status
//! POST /tickets/{id}/status            - Change status
//! POST /tickets/{id}/assign            - Assign to staff member
//!
//! # Catalogue
//! GET  /payment-methods                - Payment methods
//! POST /payment-methods                - Create
//! POST /payment-methods/{id}/toggle    - Enable / disable
//! POST /payment-methods/{id}/delete    - Delete
//! GET  /plans                          - Service plans (same four routes)
//! GET  /extensions                     - Domain extensions (same four routes)
//!
//! # Settings (admin)
//! GET  /settings                       - SMTP settings and test form
//! POST /settings/smtp-test             - Test SMTP connection (form)
//!
//! # Functions
//! POST /api/functions/test-smtp        - Test SMTP connection (JSON, CORS *)
//! ```
//!
//! Mutations re-render the list they were posted from, refetched after the
//! write, with the outcome as a notice.

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod domains;
pub mod functions;
pub mod invoices;
pub mod live;
pub mod orders;
pub mod services;
pub mod settings;
pub mod tickets;
pub mod users;

use std::str::FromStr;

use axum::{
    Router,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use angohost_baas::{LoadState, ResourceView};
use angohost_core::{Entity, Notice};

use crate::state::AppState;

/// Query string of list pages.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl ListParams {
    /// The `status` filter, if set to a known value.
    #[must_use]
    pub fn status<T: FromStr>(&self) -> Option<T> {
        parse_choice(self.status.as_deref())
    }

    /// The `role` filter, if set to a known value.
    #[must_use]
    pub fn role<T: FromStr>(&self) -> Option<T> {
        parse_choice(self.role.as_deref())
    }
}

/// Parse a select value; the empty "All" option and unknown values are
/// treated as no choice.
fn parse_choice<T: FromStr>(value: Option<&str>) -> Option<T> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

/// Blank optional form fields count as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a money amount typed by staff. Accepts `19900`, `19900.50` and
/// `19900,50`; rejects negatives.
pub(crate) fn parse_amount(field: &str, value: &str) -> Result<Decimal, String> {
    let cleaned: String = value.trim().chars().filter(|c| !c.is_whitespace()).collect();
    match Decimal::from_str(&cleaned.replace(',', ".")) {
        Ok(amount) if amount.is_sign_negative() => Err(format!("{field} cannot be negative")),
        Ok(amount) => Ok(amount),
        Err(_) => Err(format!("{field} is not a valid amount")),
    }
}

/// Optional amount: blank means none.
pub(crate) fn parse_optional_amount(
    field: &str,
    value: Option<String>,
) -> Result<Option<Decimal>, String> {
    non_empty(value)
        .map(|v| parse_amount(field, &v))
        .transpose()
}

/// Optional `YYYY-MM-DD` date from a date input.
pub(crate) fn parse_optional_date(
    field: &str,
    value: Option<String>,
) -> Result<Option<NaiveDate>, String> {
    non_empty(value)
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| format!("{field} must be a date (YYYY-MM-DD)"))
        })
        .transpose()
}

/// Make sure the view holds a list, then hand back its rows and notice.
///
/// A successful mutation has already refetched; a failed one, or a plain
/// page view, still needs the first load.
pub(crate) async fn settle<E: Entity>(mut view: ResourceView<E>) -> (Vec<E>, Option<Notice>) {
    if *view.state() == LoadState::Loading {
        view.load().await;
    }
    view.into_parts()
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the user management router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/{id}/role", post(users::set_role))
        .route("/{id}/toggle-active", post(users::toggle_active))
        .route("/{id}/delete", post(users::delete))
}

/// Create the billing routers.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}/status", post(orders::set_status))
        .route("/{id}/invoice", post(orders::create_invoice))
}

pub fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(invoices::index))
        .route("/{id}/status", post(invoices::set_status))
        .route("/sweep-overdue", post(invoices::sweep_overdue))
}

/// Create the customer asset routers.
pub fn domain_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(domains::index))
        .route("/{id}/status", post(domains::set_status))
        .route("/{id}/flag", post(domains::toggle_flag))
        .route("/{id}/delete", post(domains::delete))
}

pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(services::index).post(services::create))
        .route("/{id}/status", post(services::set_status))
        .route("/{id}/delete", post(services::delete))
}

pub fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(tickets::index))
        .route("/{id}/status", post(tickets::set_status))
        .route("/{id}/assign", post(tickets::assign))
}

/// Create the catalogue routers.
pub fn payment_method_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(catalog::payment_methods).post(catalog::create_payment_method),
        )
        .route("/{id}/toggle", post(catalog::toggle_payment_method))
        .route("/{id}/delete", post(catalog::delete_payment_method))
}

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::plans).post(catalog::create_plan))
        .route("/{id}/toggle", post(catalog::toggle_plan))
        .route("/{id}/delete", post(catalog::delete_plan))
}

pub fn extension_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(catalog::extensions).post(catalog::create_extension),
        )
        .route("/{id}/toggle", post(catalog::toggle_extension))
        .route("/{id}/delete", post(catalog::delete_extension))
}

/// Create the settings router.
pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(settings::index))
        .route("/smtp-test", post(settings::smtp_test))
}

/// Create all routes for the admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/health", get(dashboard::health))
        .route("/live", get(live::stream))
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/orders", order_routes())
        .nest("/invoices", invoice_routes())
        .nest("/domains", domain_routes())
        .nest("/services", service_routes())
        .nest("/tickets", ticket_routes())
        .nest("/payment-methods", payment_method_routes())
        .nest("/plans", plan_routes())
        .nest("/extensions", extension_routes())
        .nest("/settings", settings_routes())
        .nest("/api/functions", functions::routes())
}

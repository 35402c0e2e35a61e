//! Settings route handlers.
//!
//! The settings page hosts the SMTP connection test. With scripts enabled
//! the form calls `/api/functions/test-smtp`; without them it posts here and
//! the result comes back as a notice.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, response::IntoResponse};
use tracing::instrument;

use angohost_core::Notice;

use crate::error::Result;
use crate::middleware::RequireStaff;
use crate::models::{CurrentStaff, Section};
use crate::page::AdminPage;
use crate::services::smtp::IMPLICIT_TLS_PORT;
use crate::services::{SmtpTestRequest, test_connection};

/// Port the form starts with.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Settings page template.
#[derive(Template, WebTemplate)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub page: AdminPage,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub implicit_tls_port: u16,
}

impl SettingsTemplate {
    fn new(staff: &CurrentStaff) -> Self {
        Self {
            page: AdminPage::new(staff, Section::Settings),
            smtp_server: String::new(),
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_user: String::new(),
            implicit_tls_port: IMPLICIT_TLS_PORT,
        }
    }
}

/// Display the settings page.
pub async fn index(auth: RequireStaff) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Settings)?;
    Ok(SettingsTemplate::new(staff))
}

/// Run the SMTP test from the plain form. The password is not echoed back.
#[instrument(skip_all)]
pub async fn smtp_test(
    auth: RequireStaff,
    Form(request): Form<SmtpTestRequest>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Settings)?;
    let result = test_connection(&request).await;
    let notice = if result.success {
        Notice::success(result.message)
    } else {
        Notice::error(format!("SMTP test failed: {}", result.message))
    };

    let mut page = SettingsTemplate::new(staff);
    page.page.notices.push(notice);
    page.smtp_server = request.smtp_server;
    page.smtp_port = request.smtp_port;
    page.smtp_user = request.smtp_user;
    Ok(page)
}

//! Customer domain route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use angohost_baas::{Repository, ResourceView};
use angohost_core::models::{Domain, DomainFlag};
use angohost_core::{DomainId, DomainStatus};

use crate::components::{DataTableConfig, TableColumn, TableFilter};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::{CurrentStaff, Section};
use crate::page::AdminPage;
use crate::services::domains::{flag_label, toggle_flag as flip_flag};
use crate::state::AppState;

use super::{ListParams, settle};

/// Domain status form.
#[derive(Debug, Deserialize)]
pub struct DomainStatusForm {
    pub status: DomainStatus,
}

/// Flag toggle form.
#[derive(Debug, Deserialize)]
pub struct FlagForm {
    pub flag: DomainFlag,
}

/// Domains list template.
#[derive(Template, WebTemplate)]
#[template(path = "domains/index.html")]
pub struct DomainsTemplate {
    pub page: AdminPage,
    pub table: DataTableConfig,
    pub domains: Vec<Domain>,
    pub statuses: &'static [DomainStatus],
    pub today: NaiveDate,
}

/// Days left at which the expiry column starts warning.
const EXPIRY_WARNING_DAYS: i64 = 30;

impl DomainsTemplate {
    /// Badge text for domains that are expired or close to expiring.
    #[must_use]
    pub fn expiry_note(&self, domain: &Domain) -> Option<String> {
        match domain.days_to_expiry(self.today)? {
            days if days < 0 => Some("expired".to_string()),
            0 => Some("expires today".to_string()),
            days if days <= EXPIRY_WARNING_DAYS => Some(format!("{days} days left")),
            _ => None,
        }
    }
}

fn table_config(status: Option<DomainStatus>) -> DataTableConfig {
    DataTableConfig::new("domains")
        .column(TableColumn::new("domain_name", "Domain"))
        .column(TableColumn::new("registration_date", "Registered"))
        .column(TableColumn::new("expiry_date", "Expires"))
        .column(TableColumn::new("flags", "Lock / Privacy / Renew"))
        .column(TableColumn::new("status", "Status"))
        .filter(TableFilter::select(
            "status",
            "Status",
            DomainStatus::ALL.iter().map(|s| s.as_str()),
        ))
        .with_selection("status", status.map(DomainStatus::as_str))
        .empty_state("No domains", None)
}

fn view(state: &AppState, status: Option<DomainStatus>) -> ResourceView<Domain> {
    let query = match status {
        Some(status) => Repository::<Domain>::query().eq("status", status),
        None => Repository::<Domain>::query(),
    };
    ResourceView::with_query(state.repo::<Domain>(), query)
}

async fn render(
    staff: &CurrentStaff,
    view: ResourceView<Domain>,
    status: Option<DomainStatus>,
) -> DomainsTemplate {
    let (domains, notice) = settle(view).await;
    DomainsTemplate {
        page: AdminPage::new(staff, Section::Domains).with_notice(notice),
        table: table_config(status),
        domains,
        statuses: DomainStatus::ALL,
        today: Utc::now().date_naive(),
    }
}

/// List domains.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireStaff,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Domains)?;
    let status = params.status();
    Ok(render(staff, view(&state, status), status).await)
}

/// Change a domain's status.
#[instrument(skip_all, fields(domain = %id))]
pub async fn set_status(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<DomainId>,
    Form(form): Form<DomainStatusForm>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Domains)?;
    let mut view = view(&state, None);
    let status = form.status;
    view.mutate(&format!("Domain marked {status}"), |repo| async move {
        repo.update(id, &json!({ "status": status })).await
    })
    .await;
    Ok(render(staff, view, None).await)
}

/// Flip transfer lock, WHOIS privacy or auto-renew.
#[instrument(skip_all, fields(domain = %id))]
pub async fn toggle_flag(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<DomainId>,
    Form(form): Form<FlagForm>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Domains)?;
    let mut view = view(&state, None);
    let flag = form.flag;
    view.mutate(&format!("{} updated", flag_label(flag)), |repo| async move {
        flip_flag(&repo, id, flag).await
    })
    .await;
    Ok(render(staff, view, None).await)
}

/// Delete a domain record.
#[instrument(skip_all, fields(domain = %id))]
pub async fn delete(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<DomainId>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Domains)?;
    let mut view = view(&state, None);
    view.mutate("Domain deleted", |repo| async move { repo.delete(id).await })
        .await;
    Ok(render(staff, view, None).await)
}

#[cfg(test)]
mod tests {
    use angohost_core::UserId;

    use super::*;

    fn domain(expiry_date: Option<NaiveDate>) -> Domain {
        Domain {
            id: DomainId::generate(),
            user_id: UserId::generate(),
            domain_name: "loja.co.ao".to_string(),
            registration_date: None,
            expiry_date,
            status: DomainStatus::Active,
            whois_privacy: false,
            is_locked: true,
            auto_renew: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_expiry_note() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap_or_default();
        let page = DomainsTemplate {
            page: AdminPage {
                admin_user: crate::page::AdminUserView {
                    name: "Admin".to_string(),
                    email: "admin@angohost.ao".to_string(),
                    role: angohost_core::UserRole::Admin,
                },
                current_path: "/domains",
                nav: Vec::new(),
                notices: Vec::new(),
                live_table: Some("domains"),
            },
            table: table_config(None),
            domains: Vec::new(),
            statuses: DomainStatus::ALL,
            today,
        };
        let at = |days| domain(today.checked_add_signed(chrono::Duration::days(days)));

        assert_eq!(page.expiry_note(&at(-1)).as_deref(), Some("expired"));
        assert_eq!(page.expiry_note(&at(0)).as_deref(), Some("expires today"));
        assert_eq!(page.expiry_note(&at(12)).as_deref(), Some("12 days left"));
        assert_eq!(page.expiry_note(&at(90)), None);
        assert_eq!(page.expiry_note(&domain(None)), None);
    }
}

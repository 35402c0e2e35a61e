//! Hosting, email and VPS service route handlers.

use std::collections::HashMap;

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
use angohost_core::models::{HostingService, NewService, Profile};
use angohost_core::{Notice, ServiceId, ServiceStatus, ServiceType, UserId, UserRole};

use crate::components::{DataTableConfig, TableColumn, TableFilter};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::{CurrentStaff, Section};
use crate::page::AdminPage;
use crate::state::AppState;

use super::{ListParams, non_empty, parse_optional_amount, parse_optional_date, settle};

/// New service form.
#[derive(Debug, Deserialize)]
pub struct ServiceForm {
    pub user_id: UserId,
    pub name: String,
    pub service_type: ServiceType,
    pub status: ServiceStatus,
    #[serde(default)]
    pub price_monthly: Option<String>,
    #[serde(default)]
    pub price_yearly: Option<String>,
    #[serde(default)]
    pub renewal_date: Option<String>,
    #[serde(default)]
    pub control_panel_url: Option<String>,
}

impl ServiceForm {
    /// Validate into an insert payload.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn into_new(self) -> std::result::Result<NewService, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("Service name is required".to_string());
        }
        let control_panel_url = non_empty(self.control_panel_url);
        if let Some(url) = &control_panel_url {
            url::Url::parse(url).map_err(|_| "Control panel URL is not a valid URL".to_string())?;
        }
        Ok(NewService {
            user_id: self.user_id,
            name,
            service_type: self.service_type,
            status: self.status,
            price_monthly: parse_optional_amount("Monthly price", self.price_monthly)?,
            price_yearly: parse_optional_amount("Yearly price", self.price_yearly)?,
            renewal_date: parse_optional_date("Renewal date", self.renewal_date)?,
            control_panel_url,
        })
    }
}

/// Service status form.
#[derive(Debug, Deserialize)]
pub struct ServiceStatusForm {
    pub status: ServiceStatus,
}

/// Service row for templates.
#[derive(Debug, Clone)]
pub struct ServiceRow {
    pub service: HostingService,
    /// Owner's email, or their id when the profile is unknown.
    pub owner: String,
}

/// Services list template.
#[derive(Template, WebTemplate)]
#[template(path = "services/index.html")]
pub struct ServicesTemplate {
    pub page: AdminPage,
    pub table: DataTableConfig,
    pub rows: Vec<ServiceRow>,
    pub statuses: &'static [ServiceStatus],
    pub types: &'static [ServiceType],
    /// Customers offered in the create form.
    pub customers: Vec<Profile>,
}

fn table_config(status: Option<ServiceStatus>) -> DataTableConfig {
    DataTableConfig::new("services")
        .column(TableColumn::new("name", "Service"))
        .column(TableColumn::new("user_id", "Customer"))
        .column(TableColumn::new("service_type", "Type"))
        .column(TableColumn::numeric("price_monthly", "Monthly"))
        .column(TableColumn::new("renewal_date", "Renews"))
        .column(TableColumn::new("status", "Status"))
        .filter(TableFilter::select(
            "status",
            "Status",
            ServiceStatus::ALL.iter().map(|s| s.as_str()),
        ))
        .with_selection("status", status.map(ServiceStatus::as_str))
        .empty_state("No services", Some("Provision one with the form above."))
}

fn view(state: &AppState, status: Option<ServiceStatus>) -> ResourceView<HostingService> {
    let query = match status {
        Some(status) => Repository::<HostingService>::query().eq("status", status),
        None => Repository::<HostingService>::query(),
    };
    ResourceView::with_query(state.repo::<HostingService>(), query)
}

async fn render(
    state: &AppState,
    staff: &CurrentStaff,
    view: ResourceView<HostingService>,
    status: Option<ServiceStatus>,
    notice: Option<Notice>,
) -> ServicesTemplate {
    let (services, view_notice) = settle(view).await;
    let profiles = state.repo::<Profile>().list().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load customers for services page");
        Vec::new()
    });
    let owners: HashMap<UserId, String> = profiles
        .iter()
        .map(|p| (p.id, p.email.clone()))
        .collect();
    let rows = services
        .into_iter()
        .map(|service| ServiceRow {
            owner: owners
                .get(&service.user_id)
                .cloned()
                .unwrap_or_else(|| service.user_id.to_string()),
            service,
        })
        .collect();
    let customers = profiles
        .into_iter()
        .filter(|p| p.role == UserRole::Customer)
        .collect();

    ServicesTemplate {
        page: AdminPage::new(staff, Section::Services)
            .with_notice(notice)
            .with_notice(view_notice),
        table: table_config(status),
        rows,
        statuses: ServiceStatus::ALL,
        types: ServiceType::ALL,
        customers,
    }
}

/// List services.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireStaff,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Services)?;
    let status = params.status();
    Ok(render(&state, staff, view(&state, status), status, None).await)
}

/// Provision a service for a customer.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    auth: RequireStaff,
    Form(form): Form<ServiceForm>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Services)?;
    let mut view = view(&state, None);
    match form.into_new() {
        Ok(new) => {
            view.mutate("Service created", |repo| async move { repo.create(&new).await })
                .await;
            Ok(render(&state, staff, view, None, None).await)
        }
        Err(message) => Ok(render(&state, staff, view, None, Some(Notice::error(message))).await),
    }
}

/// Change a service's status.
#[instrument(skip_all, fields(service = %id))]
pub async fn set_status(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<ServiceId>,
    Form(form): Form<ServiceStatusForm>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Services)?;
    let mut view = view(&state, None);
    let status = form.status;
    view.mutate(&format!("Service marked {status}"), |repo| async move {
        repo.update(id, &json!({ "status": status })).await
    })
    .await;
    Ok(render(&state, staff, view, None, None).await)
}

/// Delete a service.
#[instrument(skip_all, fields(service = %id))]
pub async fn delete(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<ServiceId>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Services)?;
    let mut view = view(&state, None);
    view.mutate("Service deleted", |repo| async move { repo.delete(id).await })
        .await;
    Ok(render(&state, staff, view, None, None).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ServiceForm {
        ServiceForm {
            user_id: UserId::generate(),
            name: " Hospedagem Pro ".to_string(),
            service_type: ServiceType::Hosting,
            status: ServiceStatus::Pending,
            price_monthly: Some("4500".to_string()),
            price_yearly: Some(String::new()),
            renewal_date: Some("2026-12-01".to_string()),
            control_panel_url: Some("https://cpanel.angohost.ao".to_string()),
        }
    }

    #[test]
    fn test_valid_form_becomes_new_service() {
        let new = form().into_new().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(new.name, "Hospedagem Pro");
        assert_eq!(new.price_monthly, Some(rust_decimal::Decimal::from(4500)));
        assert_eq!(new.price_yearly, None);
        assert!(new.renewal_date.is_some());
    }

    #[test]
    fn test_invalid_fields_are_named() {
        let mut bad = form();
        bad.name = "  ".to_string();
        assert_eq!(bad.into_new().err().as_deref(), Some("Service name is required"));

        let mut bad = form();
        bad.control_panel_url = Some("not a url".to_string());
        assert!(bad.into_new().is_err());

        let mut bad = form();
        bad.price_monthly = Some("cheap".to_string());
        assert_eq!(
            bad.into_new().err().as_deref(),
            Some("Monthly price is not a valid amount")
        );
    }
}

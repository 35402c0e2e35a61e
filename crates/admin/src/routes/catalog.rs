//! Catalogue route handlers: payment methods, service plans and domain
//! extensions. Each has the same four operations: list, create, toggle
//! active, delete.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use angohost_baas::{BaasError, Repository, ResourceView};
use angohost_core::models::{
    DomainExtension, NewDomainExtension, NewPaymentMethod, NewServicePlan, PaymentMethod,
    ServicePlan,
};
use angohost_core::{
    DomainExtensionId, Entity, Notice, PaymentKind, PaymentMethodId, ServicePlanId, ServiceType,
};

use crate::components::{DataTableConfig, TableColumn};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::{CurrentStaff, Section};
use crate::page::AdminPage;
use crate::state::AppState;

use super::{non_empty, parse_amount, parse_optional_amount, settle};

/// Flip a row's `is_active` column and return the updated row.
async fn flip_active<E: Entity>(
    repo: Repository<E>,
    id: Uuid,
    is_active: fn(&E) -> bool,
) -> std::result::Result<E, BaasError> {
    let row = repo.get(id).await?;
    repo.update(id, &json!({ "is_active": !is_active(&row) }))
        .await
}

// =============================================================================
// Payment methods
// =============================================================================

/// New payment method form.
#[derive(Debug, Deserialize)]
pub struct PaymentMethodForm {
    pub name: String,
    pub kind: PaymentKind,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl PaymentMethodForm {
    /// Validate into an insert payload. New methods start active.
    ///
    /// # Errors
    ///
    /// Returns a message if the name is blank.
    pub fn into_new(self) -> std::result::Result<NewPaymentMethod, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        Ok(NewPaymentMethod {
            name,
            kind: self.kind,
            instructions: non_empty(self.instructions),
            is_active: true,
        })
    }
}

/// Payment methods template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/payment_methods.html")]
pub struct PaymentMethodsTemplate {
    pub page: AdminPage,
    pub table: DataTableConfig,
    pub methods: Vec<PaymentMethod>,
    pub kinds: &'static [PaymentKind],
}

async fn render_payment_methods(
    staff: &CurrentStaff,
    view: ResourceView<PaymentMethod>,
    notice: Option<Notice>,
) -> PaymentMethodsTemplate {
    let (methods, view_notice) = settle(view).await;
    PaymentMethodsTemplate {
        page: AdminPage::new(staff, Section::PaymentMethods)
            .with_notice(notice)
            .with_notice(view_notice),
        table: DataTableConfig::new("payment_methods")
            .column(TableColumn::new("name", "Name"))
            .column(TableColumn::new("kind", "Kind"))
            .column(TableColumn::new("instructions", "Instructions"))
            .column(TableColumn::new("is_active", "Active"))
            .empty_state(
                "No payment methods",
                Some("Checkout needs at least one active method."),
            ),
        methods,
        kinds: PaymentKind::ALL,
    }
}

/// List payment methods.
#[instrument(skip_all)]
pub async fn payment_methods(
    State(state): State<AppState>,
    auth: RequireStaff,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::PaymentMethods)?;
    let view = ResourceView::new(state.repo::<PaymentMethod>());
    Ok(render_payment_methods(staff, view, None).await)
}

/// Create a payment method.
#[instrument(skip_all)]
pub async fn create_payment_method(
    State(state): State<AppState>,
    auth: RequireStaff,
    Form(form): Form<PaymentMethodForm>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::PaymentMethods)?;
    let mut view = ResourceView::new(state.repo::<PaymentMethod>());
    let notice = match form.into_new() {
        Ok(new) => {
            view.mutate("Payment method created", |repo| async move {
                repo.create(&new).await
            })
            .await;
            None
        }
        Err(message) => Some(Notice::error(message)),
    };
    Ok(render_payment_methods(staff, view, notice).await)
}

/// Enable or disable a payment method.
#[instrument(skip_all, fields(payment_method = %id))]
pub async fn toggle_payment_method(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<PaymentMethodId>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::PaymentMethods)?;
    let mut view = ResourceView::new(state.repo::<PaymentMethod>());
    view.mutate("Payment method updated", |repo| {
        flip_active(repo, id.into(), |m: &PaymentMethod| m.is_active)
    })
    .await;
    Ok(render_payment_methods(staff, view, None).await)
}

/// Delete a payment method.
#[instrument(skip_all, fields(payment_method = %id))]
pub async fn delete_payment_method(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<PaymentMethodId>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::PaymentMethods)?;
    let mut view = ResourceView::new(state.repo::<PaymentMethod>());
    view.mutate("Payment method deleted", |repo| async move {
        repo.delete(id).await
    })
    .await;
    Ok(render_payment_methods(staff, view, None).await)
}

// =============================================================================
// Service plans
// =============================================================================

/// New plan form. Features are entered one per line.
#[derive(Debug, Deserialize)]
pub struct PlanForm {
    pub name: String,
    pub service_type: ServiceType,
    pub price_monthly: String,
    pub price_yearly: String,
    #[serde(default)]
    pub features: Option<String>,
}

impl PlanForm {
    /// Validate into an insert payload. New plans start active.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn into_new(self) -> std::result::Result<NewServicePlan, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        let features = self
            .features
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(ToString::to_string)
            .collect();
        Ok(NewServicePlan {
            name,
            service_type: self.service_type,
            price_monthly: parse_amount("Monthly price", &self.price_monthly)?,
            price_yearly: parse_amount("Yearly price", &self.price_yearly)?,
            features,
            is_active: true,
        })
    }
}

/// Service plans template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/plans.html")]
pub struct PlansTemplate {
    pub page: AdminPage,
    pub table: DataTableConfig,
    pub plans: Vec<ServicePlan>,
    pub types: &'static [ServiceType],
}

async fn render_plans(
    staff: &CurrentStaff,
    view: ResourceView<ServicePlan>,
    notice: Option<Notice>,
) -> PlansTemplate {
    let (plans, view_notice) = settle(view).await;
    PlansTemplate {
        page: AdminPage::new(staff, Section::ServicePlans)
            .with_notice(notice)
            .with_notice(view_notice),
        table: DataTableConfig::new("service_plans")
            .column(TableColumn::new("name", "Plan"))
            .column(TableColumn::new("service_type", "Type"))
            .column(TableColumn::numeric("price_monthly", "Monthly"))
            .column(TableColumn::numeric("price_yearly", "Yearly"))
            .column(TableColumn::new("features", "Features"))
            .column(TableColumn::new("is_active", "Active"))
            .empty_state("No plans", None),
        plans,
        types: ServiceType::ALL,
    }
}

/// List service plans.
#[instrument(skip_all)]
pub async fn plans(State(state): State<AppState>, auth: RequireStaff) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::ServicePlans)?;
    let view = ResourceView::new(state.repo::<ServicePlan>());
    Ok(render_plans(staff, view, None).await)
}

/// Create a service plan.
#[instrument(skip_all)]
pub async fn create_plan(
    State(state): State<AppState>,
    auth: RequireStaff,
    Form(form): Form<PlanForm>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::ServicePlans)?;
    let mut view = ResourceView::new(state.repo::<ServicePlan>());
    let notice = match form.into_new() {
        Ok(new) => {
            view.mutate("Plan created", |repo| async move { repo.create(&new).await })
                .await;
            None
        }
        Err(message) => Some(Notice::error(message)),
    };
    Ok(render_plans(staff, view, notice).await)
}

/// Enable or disable a service plan.
#[instrument(skip_all, fields(plan = %id))]
pub async fn toggle_plan(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<ServicePlanId>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::ServicePlans)?;
    let mut view = ResourceView::new(state.repo::<ServicePlan>());
    view.mutate("Plan updated", |repo| {
        flip_active(repo, id.into(), |p: &ServicePlan| p.is_active)
    })
    .await;
    Ok(render_plans(staff, view, None).await)
}

/// Delete a service plan.
#[instrument(skip_all, fields(plan = %id))]
pub async fn delete_plan(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<ServicePlanId>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::ServicePlans)?;
    let mut view = ResourceView::new(state.repo::<ServicePlan>());
    view.mutate("Plan deleted", |repo| async move { repo.delete(id).await })
        .await;
    Ok(render_plans(staff, view, None).await)
}

// =============================================================================
// Domain extensions
// =============================================================================

/// New extension form.
#[derive(Debug, Deserialize)]
pub struct ExtensionForm {
    pub extension: String,
    pub register_price: String,
    pub renew_price: String,
    #[serde(default)]
    pub transfer_price: Option<String>,
}

/// Lowercase an extension and give it exactly one leading dot. Labels must
/// be letters, digits or hyphens.
fn normalize_extension(raw: &str) -> std::result::Result<String, String> {
    let bare = raw.trim().trim_start_matches('.').to_ascii_lowercase();
    let valid = !bare.is_empty()
        && bare.split('.').all(|label| {
            !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    if valid {
        Ok(format!(".{bare}"))
    } else {
        Err(format!("\"{}\" is not a valid extension", raw.trim()))
    }
}

impl ExtensionForm {
    /// Validate into an insert payload. New extensions start active.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn into_new(self) -> std::result::Result<NewDomainExtension, String> {
        Ok(NewDomainExtension {
            extension: normalize_extension(&self.extension)?,
            register_price: parse_amount("Registration price", &self.register_price)?,
            renew_price: parse_amount("Renewal price", &self.renew_price)?,
            transfer_price: parse_optional_amount("Transfer price", self.transfer_price)?,
            is_active: true,
        })
    }
}

/// Domain extensions template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/extensions.html")]
pub struct ExtensionsTemplate {
    pub page: AdminPage,
    pub table: DataTableConfig,
    pub extensions: Vec<DomainExtension>,
}

async fn render_extensions(
    staff: &CurrentStaff,
    view: ResourceView<DomainExtension>,
    notice: Option<Notice>,
) -> ExtensionsTemplate {
    let (extensions, view_notice) = settle(view).await;
    ExtensionsTemplate {
        page: AdminPage::new(staff, Section::DomainExtensions)
            .with_notice(notice)
            .with_notice(view_notice),
        table: DataTableConfig::new("domain_extensions")
            .column(TableColumn::new("extension", "Extension"))
            .column(TableColumn::numeric("register_price", "Register"))
            .column(TableColumn::numeric("renew_price", "Renew"))
            .column(TableColumn::numeric("transfer_price", "Transfer"))
            .column(TableColumn::new("is_active", "Active"))
            .empty_state("No extensions", None),
        extensions,
    }
}

/// List domain extensions.
#[instrument(skip_all)]
pub async fn extensions(
    State(state): State<AppState>,
    auth: RequireStaff,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::DomainExtensions)?;
    let view = ResourceView::new(state.repo::<DomainExtension>());
    Ok(render_extensions(staff, view, None).await)
}

/// Create a domain extension.
#[instrument(skip_all)]
pub async fn create_extension(
    State(state): State<AppState>,
    auth: RequireStaff,
    Form(form): Form<ExtensionForm>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::DomainExtensions)?;
    let mut view = ResourceView::new(state.repo::<DomainExtension>());
    let notice = match form.into_new() {
        Ok(new) => {
            let message = format!("Extension {} created", new.extension);
            view.mutate(&message, |repo| async move { repo.create(&new).await })
                .await;
            None
        }
        Err(message) => Some(Notice::error(message)),
    };
    Ok(render_extensions(staff, view, notice).await)
}

/// Enable or disable a domain extension.
#[instrument(skip_all, fields(extension = %id))]
pub async fn toggle_extension(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<DomainExtensionId>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::DomainExtensions)?;
    let mut view = ResourceView::new(state.repo::<DomainExtension>());
    view.mutate("Extension updated", |repo| {
        flip_active(repo, id.into(), |e: &DomainExtension| e.is_active)
    })
    .await;
    Ok(render_extensions(staff, view, None).await)
}

/// Delete a domain extension.
#[instrument(skip_all, fields(extension = %id))]
pub async fn delete_extension(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<DomainExtensionId>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::DomainExtensions)?;
    let mut view = ResourceView::new(state.repo::<DomainExtension>());
    view.mutate("Extension deleted", |repo| async move { repo.delete(id).await })
        .await;
    Ok(render_extensions(staff, view, None).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use angohost_baas::{Baas, MemoryBaas};
    use angohost_core::Table;
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("ao").unwrap(), ".ao");
        assert_eq!(normalize_extension(" .CO.AO ").unwrap(), ".co.ao");
        assert!(normalize_extension(".").is_err());
        assert!(normalize_extension("co..ao").is_err());
        assert!(normalize_extension("a o").is_err());
    }

    #[test]
    fn test_plan_features_one_per_line() {
        let form = PlanForm {
            name: "Email Pro".to_string(),
            service_type: ServiceType::Email,
            price_monthly: "2500".to_string(),
            price_yearly: "25000".to_string(),
            features: Some("10 caixas\r\n\n  Antispam \n".to_string()),
        };
        let new = form.into_new().unwrap();
        assert_eq!(new.features, vec!["10 caixas", "Antispam"]);
        assert_eq!(new.price_yearly, Decimal::from(25_000));
        assert!(new.is_active);
    }

    #[test]
    fn test_extension_without_transfer_price() {
        let form = ExtensionForm {
            extension: "co.ao".to_string(),
            register_price: "19900".to_string(),
            renew_price: "19900".to_string(),
            transfer_price: Some(String::new()),
        };
        let new = form.into_new().unwrap();
        assert_eq!(new.extension, ".co.ao");
        assert_eq!(new.transfer_price, None);
    }

    #[tokio::test]
    async fn test_flip_active_twice_restores_original() {
        let baas = Arc::new(MemoryBaas::new());
        baas.seed(
            Table::PaymentMethods,
            [json!({"name": "Referência", "kind": "payment_reference", "is_active": true})],
        )
        .await;
        let repo = Repository::<PaymentMethod>::new(baas.clone() as Arc<dyn Baas>);
        let id = repo.list().await.unwrap()[0].id;

        let off = flip_active(repo.clone(), id.into(), |m: &PaymentMethod| m.is_active)
            .await
            .unwrap();
        assert!(!off.is_active);
        let on = flip_active(repo, id.into(), |m: &PaymentMethod| m.is_active)
            .await
            .unwrap();
        assert!(on.is_active);
    }
}

//! Marketing pages: home, hosting plans and email plans.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::{instrument, warn};

use angohost_baas::Repository;
use angohost_core::models::{DomainExtension, ServicePlan};
use angohost_core::{Notice, ServiceType};

use crate::filters;
use crate::page::PageContext;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub extensions: Vec<DomainExtension>,
    pub plans: Vec<ServicePlan>,
}

/// Plan listing template, shared by hosting and email.
#[derive(Template, WebTemplate)]
#[template(path = "plans.html")]
pub struct PlansTemplate {
    pub page: PageContext,
    pub title: &'static str,
    pub intro: &'static str,
    pub plans: Vec<ServicePlan>,
}

/// Active plans of one type, cheapest first. Failures leave the list empty
/// and add an error notice.
async fn active_plans(
    state: &AppState,
    service_type: ServiceType,
    page: &mut PageContext,
) -> Vec<ServicePlan> {
    let query = Repository::<ServicePlan>::query()
        .eq("is_active", true)
        .eq("service_type", service_type);
    match Repository::<ServicePlan>::new(Arc::clone(state.baas()))
        .list_where(query)
        .await
    {
        Ok(plans) => plans,
        Err(e) => {
            warn!(error = %e, "Failed to load plans");
            page.notices.push(Notice::error(e.to_string()));
            Vec::new()
        }
    }
}

/// Display the home page.
#[instrument(skip(state, page))]
pub async fn home(State(state): State<AppState>, mut page: PageContext) -> impl IntoResponse {
    let plans = active_plans(&state, ServiceType::Hosting, &mut page).await;
    let extensions = Repository::<DomainExtension>::new(Arc::clone(state.baas()))
        .list_where(Repository::<DomainExtension>::query().eq("is_active", true))
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load domain extensions");
            Vec::new()
        });

    HomeTemplate {
        page,
        extensions,
        plans,
    }
}

/// Display hosting plans.
#[instrument(skip(state, page))]
pub async fn hosting(State(state): State<AppState>, mut page: PageContext) -> impl IntoResponse {
    let plans = active_plans(&state, ServiceType::Hosting, &mut page).await;
    PlansTemplate {
        page,
        title: "Web hosting",
        intro: "Fast, local hosting for Angolan businesses.",
        plans,
    }
}

/// Display email plans.
#[instrument(skip(state, page))]
pub async fn email(State(state): State<AppState>, mut page: PageContext) -> impl IntoResponse {
    let plans = active_plans(&state, ServiceType::Email, &mut page).await;
    PlansTemplate {
        page,
        title: "Professional email",
        intro: "Email on your own domain with webmail and mobile sync.",
        plans,
    }
}

/// Display VPS plans.
#[instrument(skip(state, page))]
pub async fn vps(State(state): State<AppState>, mut page: PageContext) -> impl IntoResponse {
    let plans = active_plans(&state, ServiceType::Vps, &mut page).await;
    PlansTemplate {
        page,
        title: "Virtual servers",
        intro: "Dedicated resources with full root access.",
        plans,
    }
}

/// Health check.
pub async fn health() -> &'static str {
    "ok"
}

//! User management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use angohost_baas::{Repository, ResourceView};
use angohost_core::models::Profile;
use angohost_core::{Notice, UserId, UserRole};

use crate::components::{DataTableConfig, TableColumn, TableFilter};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::{CurrentStaff, Section};
use crate::page::AdminPage;
use crate::services::{delete_user, users};
use crate::state::AppState;

use super::{ListParams, settle};

/// Role change form.
#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: UserRole,
}

/// Users list template.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersTemplate {
    pub page: AdminPage,
    pub table: DataTableConfig,
    pub users: Vec<Profile>,
    pub roles: &'static [UserRole],
    pub self_id: UserId,
}

fn table_config(role: Option<UserRole>) -> DataTableConfig {
    DataTableConfig::new("profiles")
        .column(TableColumn::new("email", "Email"))
        .column(TableColumn::new("full_name", "Name"))
        .column(TableColumn::new("role", "Role"))
        .column(TableColumn::new("is_active", "Active"))
        .column(TableColumn::new("created_at", "Joined"))
        .filter(TableFilter::select(
            "role",
            "Role",
            UserRole::ALL.iter().map(|r| r.as_str()),
        ))
        .with_selection("role", role.map(UserRole::as_str))
        .empty_state("No users found", None)
}

fn view(state: &AppState, role: Option<UserRole>) -> ResourceView<Profile> {
    let query = match role {
        Some(role) => Repository::<Profile>::query().eq("role", role),
        None => Repository::<Profile>::query(),
    };
    ResourceView::with_query(state.repo::<Profile>(), query)
}

async fn render(
    staff: &CurrentStaff,
    view: ResourceView<Profile>,
    role: Option<UserRole>,
    notice: Option<Notice>,
) -> UsersTemplate {
    let (users, view_notice) = settle(view).await;
    UsersTemplate {
        page: AdminPage::new(staff, Section::Users)
            .with_notice(notice)
            .with_notice(view_notice),
        table: table_config(role),
        users,
        roles: UserRole::ALL,
        self_id: staff.id,
    }
}

/// List users.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireStaff,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Users)?;
    let role = params.role();
    Ok(render(staff, view(&state, role), role, None).await)
}

/// Change a user's role.
#[instrument(skip_all, fields(user = %id))]
pub async fn set_role(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<UserId>,
    Form(form): Form<RoleForm>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Users)?;
    let mut view = view(&state, None);
    if id == staff.id && form.role != UserRole::Admin {
        return Ok(render(
            staff,
            view,
            None,
            Some(Notice::error("You cannot remove your own admin role")),
        )
        .await);
    }

    let role = form.role;
    view.mutate(&format!("Role changed to {role}"), |repo| async move {
        users::set_role(&repo, id, role).await
    })
    .await;
    Ok(render(staff, view, None, None).await)
}

/// Activate or deactivate a user.
#[instrument(skip_all, fields(user = %id))]
pub async fn toggle_active(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Users)?;
    let mut view = view(&state, None);
    if id == staff.id {
        return Ok(render(
            staff,
            view,
            None,
            Some(Notice::error("You cannot deactivate your own account")),
        )
        .await);
    }

    view.mutate("User status updated", |repo| async move {
        users::toggle_active(&repo, id).await
    })
    .await;
    Ok(render(staff, view, None, None).await)
}

/// Delete a user, everything they own, and their identity.
#[instrument(skip_all, fields(user = %id))]
pub async fn delete(
    State(state): State<AppState>,
    auth: RequireStaff,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse> {
    let staff = auth.authorize(Section::Users)?;
    let notice = if id == staff.id {
        Notice::error("You cannot delete your own account")
    } else {
        delete_user(state.baas(), state.auth(), id).await.notice()
    };
    Ok(render(staff, view(&state, None), None, Some(notice)).await)
}

//! Authentication route handlers.
//!
//! Sign-in and sign-up are delegated to the BaaS identity endpoints. On
//! success only the user id, email and display name go into the session.
//! Profiles flagged inactive by staff cannot sign in.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::{info, warn};

use angohost_baas::Repository;
use angohost_core::models::Profile;
use angohost_core::{Email, Notice, UserRole};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::login_redirect;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::page::PageContext;
use crate::services::notices;
use crate::state::AppState;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// `?next=` on the auth pages.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub next: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub next: String,
    pub min_password_length: usize,
}

/// Only same-site absolute paths are followed after sign-in. Browsers read
/// `/\host` like `//host`.
fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.contains(['\r', '\n']) =>
        {
            path.to_string()
        }
        _ => "/account".to_string(),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(page: PageContext, Query(query): Query<NextQuery>) -> impl IntoResponse {
    LoginTemplate {
        page,
        next: safe_next(query.next.as_deref()),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = safe_next(form.next.as_deref());
    let retry = login_redirect(&next);

    let password = SecretString::from(form.password);
    let user = match state.auth().sign_in(form.email.trim(), &password).await {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "Login failed");
            notices::push(&session, Notice::error("Invalid email or password")).await;
            return Redirect::to(&retry).into_response();
        }
    };

    let profile = match Repository::<Profile>::new(Arc::clone(state.baas()))
        .find(user.id)
        .await
    {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, user_id = %user.id, "Failed to load profile at login");
            None
        }
    };

    if profile.as_ref().is_some_and(|p| !p.is_active) {
        info!(user_id = %user.id, "Inactive profile refused at login");
        notices::push(
            &session,
            Notice::error("This account has been deactivated. Please contact support."),
        )
        .await;
        return Redirect::to(&retry).into_response();
    }

    let current = CurrentUser {
        id: user.id,
        email: user.email,
        full_name: profile.and_then(|p| p.full_name),
    };
    if let Err(e) = set_current_user(&session, &current).await {
        tracing::error!("Failed to set session: {}", e);
        notices::push(&session, Notice::error("Could not sign you in. Please try again.")).await;
        return Redirect::to(&retry).into_response();
    }
    set_sentry_user(&current.id, Some(&current.email));

    notices::push(
        &session,
        Notice::success(format!("Welcome back, {}", current.display_name())),
    )
    .await;
    Redirect::to(&next).into_response()
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    page: PageContext,
    Query(query): Query<NextQuery>,
) -> impl IntoResponse {
    RegisterTemplate {
        page,
        next: safe_next(query.next.as_deref()),
        min_password_length: MIN_PASSWORD_LENGTH,
    }
}

/// Handle registration form submission.
///
/// Creates the identity, then the `profiles` row keyed by the same id, then
/// signs the new customer in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let next = safe_next(form.next.as_deref());
    let retry = format!("/auth/register?next={}", urlencoding::encode(&next));

    let problem = match Email::parse(&form.email) {
        Err(e) => Some(e.to_string()),
        Ok(_) if form.password.len() < MIN_PASSWORD_LENGTH => Some(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )),
        Ok(_) if form.password != form.password_confirm => {
            Some("Passwords do not match".to_string())
        }
        Ok(_) => None,
    };
    if let Some(message) = problem {
        notices::push(&session, Notice::error(message)).await;
        return Redirect::to(&retry).into_response();
    }

    let password = SecretString::from(form.password);
    let user = match state.auth().sign_up(form.email.trim(), &password).await {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "Registration failed");
            notices::push(&session, Notice::error(e.to_string())).await;
            return Redirect::to(&retry).into_response();
        }
    };

    let full_name = form
        .full_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let profile = json!({
        "id": user.id,
        "email": user.email,
        "full_name": full_name,
        "role": UserRole::Customer,
        "is_active": true,
    });
    if let Err(e) = state
        .baas()
        .insert(angohost_core::Table::Profiles, profile)
        .await
    {
        warn!(error = %e, user_id = %user.id, "Failed to create profile");
    }

    let current = CurrentUser {
        id: user.id,
        email: user.email,
        full_name,
    };
    if let Err(e) = set_current_user(&session, &current).await {
        tracing::error!("Failed to set session: {}", e);
        return Redirect::to(&login_redirect(&next)).into_response();
    }
    set_sentry_user(&current.id, Some(&current.email));

    notices::push(&session, Notice::success("Your account has been created")).await;
    Redirect::to(&next).into_response()
}

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();
    notices::push(&session, Notice::info("You have been signed out")).await;
    Redirect::to("/").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_rejects_offsite_targets() {
        assert_eq!(safe_next(Some("/checkout")), "/checkout");
        assert_eq!(safe_next(Some("//evil.example")), "/account");
        assert_eq!(safe_next(Some("https://evil.example")), "/account");
        assert_eq!(safe_next(Some("/\\evil.example")), "/account");
        assert_eq!(safe_next(Some("/\\/evil.example")), "/account");
        assert_eq!(safe_next(None), "/account");
    }
}

//! Staff sign-in.
//!
//! Credentials are checked by the BaaS identity service. Only profiles with
//! a staff role that have not been deactivated get a back-office session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, warn};

use angohost_core::Notice;
use angohost_core::models::Profile;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{LOGIN_PATH, OptionalStaff, clear_current_staff, set_current_staff};
use crate::models::CurrentStaff;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub notices: Vec<Notice>,
    pub email: String,
}

impl LoginTemplate {
    fn failed(email: &str, message: &str) -> Self {
        Self {
            notices: vec![Notice::error(message)],
            email: email.to_string(),
        }
    }
}

const NO_ACCESS: &str = "This account has no back-office access";

/// Why a signed-in profile was refused a back-office session.
fn refusal(profile: &Profile) -> Option<&'static str> {
    if !profile.role.is_staff() {
        Some(NO_ACCESS)
    } else if !profile.is_active {
        Some("This account has been deactivated")
    } else {
        None
    }
}

/// Display the login page.
pub async fn login_page(OptionalStaff(staff): OptionalStaff) -> Response {
    if staff.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate {
        notices: Vec::new(),
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim();
    let password = SecretString::from(form.password);

    let user = match state.auth().sign_in(email, &password).await {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "Staff login failed");
            return LoginTemplate::failed(email, "Invalid email or password").into_response();
        }
    };

    let profile = match state.repo::<Profile>().find(user.id).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, user_id = %user.id, "Failed to load profile at login");
            return LoginTemplate::failed(email, "Could not load your profile. Please try again.")
                .into_response();
        }
    };

    let Some(profile) = profile else {
        info!(user_id = %user.id, "Login refused: no profile");
        return LoginTemplate::failed(email, NO_ACCESS).into_response();
    };
    if let Some(message) = refusal(&profile) {
        info!(user_id = %user.id, role = %profile.role, "Back-office login refused");
        return LoginTemplate::failed(email, message).into_response();
    }

    let staff = CurrentStaff::from_profile(&profile);
    if let Err(e) = set_current_staff(&session, &staff).await {
        tracing::error!("Failed to set session: {}", e);
        return LoginTemplate::failed(email, "Could not sign you in. Please try again.")
            .into_response();
    }
    set_sentry_user(&staff.id, Some(&staff.email));
    info!(staff = %staff.id, role = %staff.role, "Staff signed in");

    Redirect::to("/").into_response()
}

/// Handle logout.
pub async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_staff(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();
    Redirect::to(LOGIN_PATH)
}

#[cfg(test)]
mod tests {
    use angohost_core::{UserId, UserRole};
    use chrono::Utc;

    use super::*;

    fn profile(role: UserRole, is_active: bool) -> Profile {
        Profile {
            id: UserId::generate(),
            email: "staff@angohost.ao".to_string(),
            full_name: None,
            role,
            is_active,
            nif: None,
            phone: None,
            address: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_refusal_reasons() {
        assert_eq!(refusal(&profile(UserRole::Customer, true)), Some(NO_ACCESS));
        assert_eq!(
            refusal(&profile(UserRole::Support, false)),
            Some("This account has been deactivated")
        );
        assert_eq!(refusal(&profile(UserRole::Finance, true)), None);
    }
}

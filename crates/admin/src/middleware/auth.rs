//! Authentication extractors for admin.
//!
//! Provides extractors for requiring a signed-in staff member in route
//! handlers. Section checks happen in the handler via
//! [`RequireStaff::authorize`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentStaff, Section, session_keys};

/// Login page.
pub const LOGIN_PATH: &str = "/auth/login";

/// Extractor that requires a signed-in staff member.
///
/// If nobody is signed in, returns a redirect to the login page for HTML
/// requests, or 401 Unauthorized for `/api/` and `/live` requests.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireStaff(staff): RequireStaff) -> impl IntoResponse {
///     format!("Hello, {}!", staff.name)
/// }
/// ```
pub struct RequireStaff(pub CurrentStaff);

impl RequireStaff {
    /// Reject with 403 unless the staff member's role opens `section`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] for roles outside the section.
    pub fn authorize(&self, section: Section) -> Result<&CurrentStaff, AppError> {
        if self.0.can(section) {
            Ok(&self.0)
        } else {
            tracing::warn!(
                staff = %self.0.id,
                role = %self.0.role,
                section = section.label(),
                "Section access denied"
            );
            Err(AppError::Forbidden(format!(
                "{} is not available to the {} role",
                section.label(),
                self.0.role
            )))
        }
    }
}

/// Error returned when a staff session is required but absent.
pub enum StaffAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API and event-stream requests).
    Unauthorized,
}

impl IntoResponse for StaffAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = StaffAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(StaffAuthRejection::Unauthorized)?;

        let staff: CurrentStaff = session
            .get(session_keys::CURRENT_STAFF)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                let path = parts.uri.path();
                if path.starts_with("/api/") || path.starts_with("/live") {
                    StaffAuthRejection::Unauthorized
                } else {
                    StaffAuthRejection::RedirectToLogin
                }
            })?;

        Ok(Self(staff))
    }
}

/// Extractor that optionally gets the current staff member.
pub struct OptionalStaff(pub Option<CurrentStaff>);

impl<S> FromRequestParts<S> for OptionalStaff
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let staff = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentStaff>(session_keys::CURRENT_STAFF)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(staff))
    }
}

/// Store `staff` in the session after cycling its id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_staff(
    session: &Session,
    staff: &CurrentStaff,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_STAFF, staff).await
}

/// Sign the staff member out by discarding the whole session.
///
/// # Errors
///
/// Returns an error if the session cannot be flushed.
pub async fn clear_current_staff(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use angohost_core::{UserId, UserRole};

    use super::*;

    fn staff(role: UserRole) -> RequireStaff {
        RequireStaff(CurrentStaff {
            id: UserId::generate(),
            email: "staff@angohost.ao".to_string(),
            name: "Staff".to_string(),
            role,
        })
    }

    #[test]
    fn test_authorize_by_role() {
        assert!(staff(UserRole::Support).authorize(Section::Tickets).is_ok());
        assert!(matches!(
            staff(UserRole::Support).authorize(Section::Users),
            Err(AppError::Forbidden(_))
        ));
        assert!(staff(UserRole::Admin).authorize(Section::Users).is_ok());
    }
}

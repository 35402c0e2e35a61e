//! Unified error handling for admin.
//!
//! Most back-office failures become a notice on the re-rendered list. The
//! errors here are the ones a handler cannot recover from: access denied,
//! unknown rows, broken sessions.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use angohost_baas::BaasError;

/// Application-level error type for the back-office.
#[derive(Debug, Error)]
pub enum AppError {
    /// BaaS operation failed.
    #[error("BaaS error: {0}")]
    Baas(#[from] BaasError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Staff member's role does not open this section.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Baas(_) | Self::Session(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Baas(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Baas(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Baas(e) if e.is_not_found() => "Not found".to_string(),
            Self::Baas(_) => "External service error".to_string(),
            Self::Session(_) => "Internal server error".to_string(),
            Self::Forbidden(_) => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for a signed-in staff member.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Forbidden("tickets".to_string());
        assert_eq!(err.to_string(), "Forbidden: tickets");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::Baas(BaasError::NotFound("orders".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Baas(BaasError::Unavailable("down".to_string()))),
            StatusCode::BAD_GATEWAY
        );
    }
}

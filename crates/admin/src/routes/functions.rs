//! Serverless-style functions callable from any origin.
//!
//! `POST /api/functions/test-smtp` takes SMTP connection parameters as JSON
//! and answers `{success, message}`. CORS is fully open and preflight
//! requests are answered.

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::{Method, StatusCode},
    routing::post,
};
use tower_http::cors::{Any, CorsLayer};

use crate::services::{SmtpTestRequest, SmtpTestResult, test_connection};
use crate::state::AppState;

/// CORS policy for functions: any origin, any header.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Create the functions router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/test-smtp", post(test_smtp))
        .layer(cors_layer())
}

/// Test an SMTP connection.
///
/// A body that does not parse still gets a `{success: false}` answer, with
/// status 400.
pub async fn test_smtp(
    body: Result<Json<SmtpTestRequest>, JsonRejection>,
) -> (StatusCode, Json<SmtpTestResult>) {
    match body {
        Ok(Json(request)) => (StatusCode::OK, Json(test_connection(&request).await)),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected SMTP test body");
            (
                StatusCode::BAD_REQUEST,
                Json(SmtpTestResult {
                    success: false,
                    message: rejection.body_text(),
                }),
            )
        }
    }
}

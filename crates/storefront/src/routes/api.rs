//! JSON API for in-page lookups.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::instrument;

use crate::services::{NifInfo, NifLookupError};
use crate::state::AppState;

/// Body of `GET /api/nif/{nif}`.
#[derive(Debug, Serialize)]
pub struct NifResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<NifInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Look a NIF up in the taxpayer registry.
///
/// Malformed input is a 400, a missing registry a 503, and every registry
/// failure a 502 with the same generic message.
#[instrument(skip(state))]
pub async fn nif_lookup(State(state): State<AppState>, Path(nif): Path<String>) -> Response {
    match state.nif().lookup_str(&nif).await {
        Ok(info) => Json(NifResponse {
            success: true,
            data: Some(info),
            message: None,
        })
        .into_response(),
        Err(e) => {
            let status = match e {
                NifLookupError::Invalid(_) => StatusCode::BAD_REQUEST,
                NifLookupError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                NifLookupError::Failed => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                Json(NifResponse {
                    success: false,
                    data: None,
                    message: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

//! Domain search page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use angohost_core::Notice;

use crate::filters;
use crate::page::PageContext;
use crate::services::domains::{self, DomainSearch};
use crate::state::AppState;

/// Registration periods offered in the search results.
pub const YEAR_CHOICES: [u32; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

/// `?q=` search query.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Domain search template.
#[derive(Template, WebTemplate)]
#[template(path = "domains/search.html")]
pub struct DomainSearchTemplate {
    pub page: PageContext,
    pub query: String,
    pub result: Option<DomainSearch>,
    pub years: &'static [u32],
}

/// Display the search form and, with `?q=`, its results.
#[instrument(skip(state, page))]
pub async fn search(
    State(state): State<AppState>,
    mut page: PageContext,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let q = query.q.trim().to_string();
    let result = if q.is_empty() {
        None
    } else {
        match domains::search(state.baas(), &q).await {
            Ok(result) => Some(result),
            Err(e) => {
                page.notices.push(Notice::error(e.to_string()));
                None
            }
        }
    };

    DomainSearchTemplate {
        page,
        query: q,
        result,
        years: &YEAR_CHOICES,
    }
}

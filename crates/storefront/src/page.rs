//! Data every rendered page needs: who is signed in, the cart badge, and
//! notices queued by the previous request.

use angohost_core::Notice;
use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};
use crate::services::{cart, notices};

/// Shared layout context, extracted from the session.
///
/// Extracting it takes the queued notices, so only page-rendering handlers
/// should ask for it.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub cart_count: u32,
    pub notices: Vec<Notice>,
}

impl PageContext {
    /// Build the context from a session.
    pub async fn load(session: &Session) -> Self {
        let user = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten();
        Self {
            user,
            cart_count: cart::load(session).await.item_count(),
            notices: notices::take(session).await,
        }
    }

    /// Add a notice produced while handling this request.
    #[must_use]
    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(match parts.extensions.get::<Session>() {
            Some(session) => Self::load(session).await,
            None => Self::default(),
        })
    }
}

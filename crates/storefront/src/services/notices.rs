//! Notices queued in the session.
//!
//! Handlers that redirect push a notice; the next rendered page takes every
//! queued notice and shows it once.

use angohost_core::Notice;
use tower_sessions::Session;
use tracing::warn;

use crate::models::session_keys;

/// Queue `notice` for the next page.
pub async fn push(session: &Session, notice: Notice) {
    let mut queued: Vec<Notice> = session
        .get(session_keys::NOTICES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    queued.push(notice);
    if let Err(e) = session.insert(session_keys::NOTICES, queued).await {
        warn!(error = %e, "Failed to queue notice");
    }
}

/// Take every queued notice, leaving none.
pub async fn take(session: &Session) -> Vec<Notice> {
    session
        .remove::<Vec<Notice>>(session_keys::NOTICES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

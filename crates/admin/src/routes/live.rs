//! Live refresh event stream.
//!
//! Each open back-office page keeps one `EventSource` on `/live`. When a
//! `refresh` event names the page's table, the page reloads its list.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};

use crate::error::Result;
use crate::middleware::RequireStaff;
use crate::models::Section;
use crate::services::live::{refresh_signals, visible_tables};
use crate::state::AppState;

/// Stream `refresh` events, one per changed table per coalescing window.
/// Only tables the staff member's role can open are reported.
pub async fn stream(
    State(state): State<AppState>,
    auth: RequireStaff,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let staff = auth.authorize(Section::Dashboard)?;
    let tables = visible_tables(staff);
    tracing::debug!(staff = %staff.id, tables = tables.len(), "Live stream opened");
    let signals = refresh_signals(state.baas().as_ref(), &tables, state.config().coalesce_window)
        .map(|table| Ok(Event::default().event("refresh").data(table.name())));
    Ok(Sse::new(signals).keep_alive(KeepAlive::default()))
}

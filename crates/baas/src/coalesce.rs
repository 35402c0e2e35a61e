//! Change-event coalescing.
//!
//! A single checkout writes several rows, and an admin bulk action can touch
//! dozens. Refetching a whole list for every event would hammer the BaaS, so
//! events are collapsed per table: the first event for a table opens a
//! window, later events for that table inside the window are absorbed, and
//! one refresh signal for the table is emitted when the window closes.

use std::collections::BTreeMap;
use std::time::Duration;

use angohost_core::Table;
use futures::{Stream, StreamExt};
use tokio::time::Instant;

use crate::realtime::ChangeEvent;

/// Default coalescing window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(250);

/// Collapse `events` into at most one refresh signal per table per `window`.
///
/// When the input ends, tables with a pending window are flushed at once.
pub fn coalesce<S>(events: S, window: Duration) -> impl Stream<Item = Table> + Send + 'static
where
    S: Stream<Item = ChangeEvent> + Send + 'static,
{
    async_stream::stream! {
        let mut events = Box::pin(events);
        let mut pending: BTreeMap<Table, Instant> = BTreeMap::new();

        loop {
            let next_deadline = pending.values().min().copied();
            let wait = async move {
                match next_deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => futures::future::pending::<()>().await,
                }
            };

            tokio::select! {
                event = events.next() => match event {
                    Some(event) => {
                        pending
                            .entry(event.table)
                            .or_insert_with(|| Instant::now() + window);
                    }
                    None => break,
                },
                () = wait => {
                    let now = Instant::now();
                    let due: Vec<Table> = pending
                        .iter()
                        .filter(|(_, deadline)| **deadline <= now)
                        .map(|(table, _)| *table)
                        .collect();
                    for table in due {
                        pending.remove(&table);
                        yield table;
                    }
                }
            }
        }

        for table in pending.into_keys() {
            yield table;
        }
    }
}

//! Refresh signals for open back-office pages.
//!
//! Pages listen on `/live` and reload their list when their table changes.
//! Raw change events are coalesced first so a burst of writes costs each
//! page one reload. A staff member only hears about tables behind the
//! sections their role can open.

use std::time::Duration;

use futures::Stream;

use angohost_baas::{Baas, coalesce};
use angohost_core::Table;

use crate::models::{CurrentStaff, Section};

/// Tables behind the sections `staff` may open.
#[must_use]
pub fn visible_tables(staff: &CurrentStaff) -> Vec<Table> {
    Section::ALL
        .iter()
        .filter(|section| staff.can(**section))
        .filter_map(|section| section.table())
        .collect()
}

/// Stream of `tables` that changed, at most one signal per table per `window`.
pub fn refresh_signals(
    baas: &dyn Baas,
    tables: &[Table],
    window: Duration,
) -> impl Stream<Item = Table> + Send + 'static + use<> {
    coalesce(baas.subscribe_many(tables).into_stream(), window)
}

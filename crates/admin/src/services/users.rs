//! Customer and staff account management.
//!
//! Profiles are plain rows; the identity behind them lives in the BaaS
//! identity service. Deleting a user therefore touches every table that
//! holds rows owned by them, then the profile, then the identity. There is
//! no transaction across those steps: each one is attempted even when an
//! earlier one failed, and the failures are reported together.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, instrument, warn};

use angohost_baas::{Auth, Baas, BaasError, Query, Repository};
use angohost_core::models::Profile;
use angohost_core::{Notice, Table, UserId, UserRole};

/// Tables cleared of a user's rows before the profile goes, in order.
pub const OWNED_TABLES: &[Table] = &[
    Table::Tickets,
    Table::Domains,
    Table::Services,
    Table::Invoices,
    Table::Orders,
    Table::AbandonedCarts,
];

/// Change a profile's role.
///
/// # Errors
///
/// Returns an error if the update fails or no profile has this id.
pub async fn set_role(
    repo: &Repository<Profile>,
    id: UserId,
    role: UserRole,
) -> Result<Profile, BaasError> {
    repo.update(id, &json!({ "role": role })).await
}

/// Flip a profile's `is_active` flag and return the updated profile.
///
/// # Errors
///
/// Returns an error if the profile cannot be read or updated.
pub async fn toggle_active(repo: &Repository<Profile>, id: UserId) -> Result<Profile, BaasError> {
    let profile = repo.get(id).await?;
    repo.update(id, &json!({ "is_active": !profile.is_active }))
        .await
}

/// One step of a user deletion that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedStep {
    pub step: String,
    pub error: String,
}

/// What a user deletion did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    /// Rows removed per owned table.
    pub removed: Vec<(Table, usize)>,
    pub failed: Vec<FailedStep>,
}

impl DeletionReport {
    /// Whether every step succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Names of the failed steps, comma separated.
    #[must_use]
    pub fn failed_steps(&self) -> String {
        self.failed
            .iter()
            .map(|f| f.step.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Notice summarising the deletion for the operator.
    #[must_use]
    pub fn notice(&self) -> Notice {
        if self.is_complete() {
            Notice::success("User deleted")
        } else {
            Notice::error(format!(
                "User deleted with errors; failed steps: {}",
                self.failed_steps()
            ))
        }
    }

    fn record(&mut self, step: impl Into<String>, error: &BaasError) {
        let step = step.into();
        warn!(step = %step, error = %error, "User deletion step failed");
        self.failed.push(FailedStep {
            step,
            error: error.to_string(),
        });
    }
}

/// Delete a user and everything they own.
///
/// Runs every cleanup step regardless of earlier failures. The identity is
/// removed last so a partly cleaned user can still be found and retried.
#[instrument(skip(baas, auth))]
pub async fn delete_user(baas: &Arc<dyn Baas>, auth: &dyn Auth, id: UserId) -> DeletionReport {
    let mut report = DeletionReport::default();

    for table in OWNED_TABLES {
        match baas.delete(&Query::table(*table).eq("user_id", id)).await {
            Ok(rows) => report.removed.push((*table, rows.len())),
            Err(e) => report.record(table.name(), &e),
        }
    }

    if let Err(e) = baas.delete(&Query::table(Table::Profiles).eq("id", id)).await {
        report.record(Table::Profiles.name(), &e);
    }

    if let Err(e) = auth.delete_user(id).await {
        report.record("identity", &e);
    }

    info!(user = %id, complete = report.is_complete(), "User deletion finished");
    report
}

//! Profile role and activation commands.
//!
//! # Usage
//!
//! ```bash
//! # Promote a member of staff
//! ah-cli user set-role -u ana@angohost.ao -r support
//!
//! # Deactivate (or re-activate) an account
//! ah-cli user toggle-active -u ana@angohost.ao
//! ```
//!
//! Users are identified by email or profile id. Role changes apply the next
//! time the user signs in.

use std::sync::Arc;

use angohost_admin::services::users;
use angohost_baas::{Baas, Repository};
use angohost_core::models::Profile;
use angohost_core::{UserId, UserRole};

use super::CommandError;

/// Find a profile by id or email address.
///
/// # Errors
///
/// Returns [`CommandError::UserNotFound`] if nothing matches.
pub async fn find_profile(repo: &Repository<Profile>, who: &str) -> Result<Profile, CommandError> {
    let who = who.trim();
    let found = match who.parse::<UserId>() {
        Ok(id) => repo.find(id).await?,
        Err(_) => {
            let query = Repository::<Profile>::query().eq("email", who.to_lowercase());
            repo.list_where(query).await?.into_iter().next()
        }
    };
    found.ok_or_else(|| CommandError::UserNotFound(who.to_string()))
}

/// Change a user's role.
///
/// # Errors
///
/// Returns an error for an unknown role or user, or a failed update.
pub async fn set_role(baas: Arc<dyn Baas>, who: &str, role: &str) -> Result<Profile, CommandError> {
    let role: UserRole = role
        .parse()
        .map_err(|_| CommandError::InvalidRole(role.to_owned()))?;
    let repo = Repository::<Profile>::new(baas);
    let profile = find_profile(&repo, who).await?;

    tracing::info!("Changing role of {} from {} to {}", profile.email, profile.role, role);
    Ok(users::set_role(&repo, profile.id, role).await?)
}

/// Flip a user's active flag.
///
/// # Errors
///
/// Returns an error for an unknown user or a failed update.
pub async fn toggle_active(baas: Arc<dyn Baas>, who: &str) -> Result<Profile, CommandError> {
    let repo = Repository::<Profile>::new(baas);
    let profile = find_profile(&repo, who).await?;
    Ok(users::toggle_active(&repo, profile.id).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use angohost_baas::MemoryBaas;
    use angohost_core::Table;
    use serde_json::json;

    use super::*;

    async fn baas_with_profile(id: UserId) -> Arc<dyn Baas> {
        let baas = MemoryBaas::new();
        baas.seed(
            Table::Profiles,
            [json!({"id": id, "email": "ana@angohost.ao", "role": "customer", "is_active": true})],
        )
        .await;
        Arc::new(baas)
    }

    #[tokio::test]
    async fn test_set_role_by_email() {
        let id = UserId::generate();
        let baas = baas_with_profile(id).await;

        let profile = set_role(Arc::clone(&baas), " Ana@AngoHost.ao ", "support")
            .await
            .unwrap();
        assert_eq!(profile.id, id);
        assert_eq!(profile.role, UserRole::Support);
    }

    #[tokio::test]
    async fn test_set_role_rejects_unknown_role() {
        let baas = baas_with_profile(UserId::generate()).await;
        let err = set_role(baas, "ana@angohost.ao", "owner").await.unwrap_err();
        assert!(matches!(err, CommandError::InvalidRole(_)));
    }

    #[tokio::test]
    async fn test_toggle_active_by_id_twice() {
        let id = UserId::generate();
        let baas = baas_with_profile(id).await;

        let profile = toggle_active(Arc::clone(&baas), &id.to_string()).await.unwrap();
        assert!(!profile.is_active);
        let profile = toggle_active(baas, &id.to_string()).await.unwrap();
        assert!(profile.is_active);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let baas = baas_with_profile(UserId::generate()).await;
        let err = toggle_active(baas, "nobody@angohost.ao").await.unwrap_err();
        assert!(matches!(err, CommandError::UserNotFound(_)));
    }
}

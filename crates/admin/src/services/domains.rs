//! Domain flag changes.

use serde_json::{Map, Value};

use angohost_baas::{BaasError, Repository};
use angohost_core::DomainId;
use angohost_core::models::{Domain, DomainFlag};

/// Operator-facing name of a flag.
#[must_use]
pub const fn flag_label(flag: DomainFlag) -> &'static str {
    match flag {
        DomainFlag::IsLocked => "Transfer lock",
        DomainFlag::WhoisPrivacy => "WHOIS privacy",
        DomainFlag::AutoRenew => "Auto-renew",
    }
}

/// Flip one boolean flag on a domain and return the updated row.
///
/// # Errors
///
/// Returns an error if the domain cannot be read or updated.
pub async fn toggle_flag(
    repo: &Repository<Domain>,
    id: DomainId,
    flag: DomainFlag,
) -> Result<Domain, BaasError> {
    let domain = repo.get(id).await?;
    let mut patch = Map::new();
    patch.insert(flag.column().to_string(), Value::Bool(!flag.get(&domain)));
    repo.update(id, &patch).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use angohost_baas::{Baas, MemoryBaas};
    use angohost_core::{Table, UserId};
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_toggle_flag_touches_only_that_flag() {
        let baas = Arc::new(MemoryBaas::new());
        baas.seed(
            Table::Domains,
            [json!({
                "user_id": UserId::generate(),
                "domain_name": "loja.ao",
                "status": "active",
                "is_locked": true,
                "whois_privacy": false,
                "auto_renew": true
            })],
        )
        .await;
        let repo = Repository::<Domain>::new(baas.clone() as Arc<dyn Baas>);
        let id = repo.list().await.unwrap()[0].id;

        let domain = toggle_flag(&repo, id, DomainFlag::WhoisPrivacy).await.unwrap();
        assert!(domain.whois_privacy);
        assert!(domain.is_locked);
        assert!(domain.auto_renew);

        let domain = toggle_flag(&repo, id, DomainFlag::IsLocked).await.unwrap();
        assert!(!domain.is_locked);
    }
}

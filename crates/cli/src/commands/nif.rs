//! NIF registry lookup.

use std::time::Duration;

use angohost_storefront::config::NifConfig;
use angohost_storefront::services::{NifClient, NifInfo};

use super::CommandError;

/// Look up a taxpayer number against the registry at `lookup_url`.
///
/// # Errors
///
/// Returns an error for a malformed NIF, a missing URL, or any registry
/// failure.
pub async fn lookup(
    lookup_url: Option<String>,
    timeout: Duration,
    nif: &str,
) -> Result<NifInfo, CommandError> {
    let client = NifClient::new(&NifConfig {
        lookup_url,
        timeout,
    });
    let info = client.lookup_str(nif).await?;
    tracing::info!(
        "{} {} ({})",
        info.nif,
        info.name,
        info.address.as_deref().unwrap_or("no address on record")
    );
    Ok(info)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use angohost_storefront::services::NifLookupError;

    use super::*;

    #[tokio::test]
    async fn test_lookup_without_url_is_not_configured() {
        let err = lookup(None, Duration::from_secs(1), "5417123456")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::Nif(NifLookupError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_malformed_nif_fails_before_any_request() {
        let err = lookup(
            Some("http://127.0.0.1:1/nif".to_string()),
            Duration::from_secs(1),
            "   ",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CommandError::Nif(NifLookupError::Invalid(_))));
    }
}

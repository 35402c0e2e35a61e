//! NIF lookup against the external taxpayer registry.
//!
//! The registry is queried with `GET {lookup_url}/{nif}` and answers with a
//! JSON object carrying the taxpayer's name and address. Field names vary
//! between registry deployments (`name`/`nome`, `address`/`morada`), so both
//! spellings are accepted. Results are cached for ten minutes.
//!
//! Every failure (timeout, non-2xx status, unparseable body) is reported to
//! the caller as the same generic message; details go to the log only.

use std::sync::Arc;
use std::time::Duration;

use angohost_core::{Nif, NifError};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::NifConfig;

const CACHE_TTL: Duration = Duration::from_secs(600);

/// Message shown for any lookup failure.
pub const LOOKUP_FAILED_MESSAGE: &str =
    "Could not verify the NIF right now. Please try again later.";

/// Taxpayer details returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NifInfo {
    #[serde(default)]
    pub nif: String,
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(default, alias = "morada")]
    pub address: Option<String>,
}

/// Lookup errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NifLookupError {
    #[error("NIF lookup is not configured")]
    NotConfigured,

    #[error(transparent)]
    Invalid(#[from] NifError),

    #[error("Could not verify the NIF right now. Please try again later.")]
    Failed,
}

/// Cached HTTP client for the NIF registry.
#[derive(Clone)]
pub struct NifClient {
    inner: Arc<NifClientInner>,
}

struct NifClientInner {
    client: reqwest::Client,
    lookup_url: Option<String>,
    cache: Cache<Nif, NifInfo>,
}

impl NifClient {
    /// Build a client from configuration.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized.
    #[must_use]
    pub fn new(config: &NifConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to build NIF HTTP client");
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(NifClientInner {
                client,
                lookup_url: config
                    .lookup_url
                    .as_ref()
                    .map(|u| u.trim_end_matches('/').to_string()),
                cache,
            }),
        }
    }

    /// Whether a registry URL is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.lookup_url.is_some()
    }

    /// Parse `input` and look it up.
    ///
    /// # Errors
    ///
    /// Returns [`NifLookupError::Invalid`] for malformed input before any
    /// request is made, [`NifLookupError::NotConfigured`] without a registry,
    /// and [`NifLookupError::Failed`] for every registry failure.
    pub async fn lookup_str(&self, input: &str) -> Result<NifInfo, NifLookupError> {
        let nif = Nif::parse(input)?;
        self.lookup(&nif).await
    }

    /// Look up a parsed NIF.
    ///
    /// # Errors
    ///
    /// See [`Self::lookup_str`].
    #[instrument(skip(self), fields(nif = %nif))]
    pub async fn lookup(&self, nif: &Nif) -> Result<NifInfo, NifLookupError> {
        let Some(base) = self.inner.lookup_url.as_deref() else {
            return Err(NifLookupError::NotConfigured);
        };

        if let Some(hit) = self.inner.cache.get(nif).await {
            debug!("NIF cache hit");
            return Ok(hit);
        }

        let url = format!("{base}/{}", urlencoding::encode(nif.as_str()));
        let response = self
            .inner
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "NIF registry request failed");
                NifLookupError::Failed
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "NIF registry returned an error status");
            return Err(NifLookupError::Failed);
        }

        let body = response.text().await.map_err(|e| {
            warn!(error = %e, "Failed to read NIF registry response");
            NifLookupError::Failed
        })?;

        let info = parse_lookup_body(nif, &body).ok_or(NifLookupError::Failed)?;
        self.inner.cache.insert(nif.clone(), info.clone()).await;
        Ok(info)
    }
}

impl std::fmt::Debug for NifClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NifClient")
            .field("lookup_url", &self.inner.lookup_url)
            .finish_non_exhaustive()
    }
}

/// Decode a registry response body.
///
/// Accepts the object at the top level or wrapped in `data`. Returns `None`
/// when no name can be found.
#[must_use]
pub fn parse_lookup_body(nif: &Nif, body: &str) -> Option<NifInfo> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "NIF registry returned invalid JSON");
            return None;
        }
    };
    let object = value.get("data").cloned().unwrap_or(value);
    let mut info: NifInfo = serde_json::from_value(object)
        .map_err(|e| warn!(error = %e, "NIF registry response missing fields"))
        .ok()?;
    if info.name.trim().is_empty() {
        return None;
    }
    if info.nif.is_empty() {
        info.nif = nif.to_string();
    }
    Some(info)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{Json, Router, extract::Path, extract::State, routing::get};

    use super::*;

    /// Serve a registry on an ephemeral port; returns its lookup URL and a
    /// request counter.
    async fn registry() -> (String, Arc<AtomicUsize>) {
        async fn lookup(
            State(hits): State<Arc<AtomicUsize>>,
            Path(nif): Path<String>,
        ) -> Json<serde_json::Value> {
            hits.fetch_add(1, Ordering::SeqCst);
            Json(serde_json::json!({
                "nif": nif,
                "nome": "Loja Kianda",
                "morada": "Rua Direita, Benguela"
            }))
        }

        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/nif/{nif}", get(lookup))
            .with_state(Arc::clone(&hits));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/nif/"), hits)
    }

    fn nif() -> Nif {
        Nif::parse("5417123456").unwrap()
    }

    #[test]
    fn test_parse_english_fields() {
        let info = parse_lookup_body(
            &nif(),
            r#"{"nif":"5417123456","name":"AngoHost Lda","address":"Luanda"}"#,
        )
        .unwrap();
        assert_eq!(info.name, "AngoHost Lda");
        assert_eq!(info.address.as_deref(), Some("Luanda"));
    }

    #[test]
    fn test_parse_portuguese_fields_wrapped_in_data() {
        let info = parse_lookup_body(
            &nif(),
            r#"{"data":{"nome":"Loja Kianda","morada":"Rua Direita, Benguela"}}"#,
        )
        .unwrap();
        assert_eq!(info.nif, "5417123456");
        assert_eq!(info.name, "Loja Kianda");
        assert_eq!(info.address.as_deref(), Some("Rua Direita, Benguela"));
    }

    #[test]
    fn test_parse_rejects_missing_or_blank_name() {
        assert!(parse_lookup_body(&nif(), r#"{"address":"Luanda"}"#).is_none());
        assert!(parse_lookup_body(&nif(), r#"{"name":"  "}"#).is_none());
        assert!(parse_lookup_body(&nif(), "<html>502</html>").is_none());
    }

    #[test]
    fn test_failure_message_is_generic() {
        assert_eq!(NifLookupError::Failed.to_string(), LOOKUP_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_unconfigured_client() {
        let client = NifClient::new(&NifConfig::default());
        assert!(!client.is_configured());
        assert!(matches!(
            client.lookup_str("5417123456").await,
            Err(NifLookupError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_request() {
        let client = NifClient::new(&NifConfig {
            lookup_url: Some("http://127.0.0.1:9/nif".to_string()),
            timeout: Duration::from_millis(200),
        });
        assert!(matches!(
            client.lookup_str("12ab").await,
            Err(NifLookupError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_registry_maps_to_generic_failure() {
        let client = NifClient::new(&NifConfig {
            lookup_url: Some("http://127.0.0.1:9/nif".to_string()),
            timeout: Duration::from_millis(500),
        });
        let err = client.lookup(&nif()).await.unwrap_err();
        assert_eq!(err.to_string(), LOOKUP_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_lookup_surfaces_registry_fields_and_caches_them() {
        let (url, hits) = registry().await;
        let client = NifClient::new(&NifConfig {
            lookup_url: Some(url),
            timeout: Duration::from_secs(5),
        });

        let info = client.lookup_str("5417123456").await.unwrap();
        assert_eq!(info.nif, "5417123456");
        assert_eq!(info.name, "Loja Kianda");
        assert_eq!(info.address.as_deref(), Some("Rua Direita, Benguela"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let again = client.lookup(&nif()).await.unwrap();
        assert_eq!(again, info);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}

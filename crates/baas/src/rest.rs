//! REST implementation of [`Baas`].
//!
//! Tables are exposed at `{base}/rest/v1/{table}`: `GET` selects, `POST`
//! inserts, `PATCH` updates and `DELETE` deletes, with filters passed as
//! `column=op.value` query parameters. Every request carries the service key
//! as both `apikey` and bearer token; writes ask for the affected rows back
//! with `Prefer: return=representation`.

use std::sync::Arc;

use angohost_core::Table;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, instrument};
use url::Url;

use crate::client::Baas;
use crate::config::BaasConfig;
use crate::error::BaasError;
use crate::query::Query;
use crate::realtime::{EventFilter, RealtimeHub, Subscription};

/// HTTP client for the BaaS REST endpoints.
///
/// Change subscriptions are served from a [`RealtimeHub`]; spawn
/// [`realtime::listen`](crate::realtime::listen) with [`RestClient::hub`] to
/// feed it.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

struct RestClientInner {
    client: reqwest::Client,
    rest_base: Url,
    service_key: SecretString,
    hub: RealtimeHub,
}

/// Error body returned by the REST endpoints.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

impl RestClient {
    /// Create a client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: &BaasConfig) -> Result<Self, BaasError> {
        let rest_base = Url::parse(&config.base_url())?.join("rest/v1/")?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(RestClientInner {
                client,
                rest_base,
                service_key: config.service_key.clone(),
                hub: RealtimeHub::new(),
            }),
        })
    }

    /// Hub that subscriptions are served from.
    #[must_use]
    pub fn hub(&self) -> RealtimeHub {
        self.inner.hub.clone()
    }

    /// URL for `query`, with its filters encoded as query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`BaasError::Url`] if the table path cannot be joined.
    pub fn url_for(&self, query: &Query) -> Result<Url, BaasError> {
        let mut url = self.inner.rest_base.join(query.table.name())?;
        let params = query.to_params();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Vec<Value>, BaasError> {
        let key = self.inner.service_key.expose_secret();
        let mut request = self
            .inner
            .client
            .request(method.clone(), url)
            .header("apikey", key)
            .bearer_auth(key)
            .header("Accept", "application/json");

        if method != Method::GET {
            request = request.header("Prefer", "return=representation");
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = api_error_message(status, &text);
            error!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "BaaS returned non-success status"
            );
            return Err(BaasError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&text)? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row => Ok(vec![row]),
        }
    }
}

/// Human-readable message from an error response body.
fn api_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| {
            let mut parts: Vec<String> = [b.message, b.details, b.hint]
                .into_iter()
                .flatten()
                .filter(|s| !s.is_empty())
                .collect();
            parts.dedup();
            (!parts.is_empty()).then(|| parts.join(": "))
        })
        .unwrap_or_else(|| {
            let snippet: String = body.chars().take(200).collect();
            if snippet.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                snippet
            }
        })
}

#[async_trait]
impl Baas for RestClient {
    #[instrument(skip(self), fields(table = %query.table))]
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BaasError> {
        let url = self.url_for(query)?;
        let rows = self.send(Method::GET, url, None).await?;
        debug!(rows = rows.len(), "Selected rows");
        Ok(rows)
    }

    #[instrument(skip(self, row), fields(table = %table))]
    async fn insert(&self, table: Table, row: Value) -> Result<Value, BaasError> {
        let url = self.url_for(&Query::table(table))?;
        self.send(Method::POST, url, Some(&row))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BaasError::NotFound(format!("{table}: insert returned no row")))
    }

    #[instrument(skip(self, patch), fields(table = %query.table))]
    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, BaasError> {
        let url = self.url_for(query)?;
        self.send(Method::PATCH, url, Some(&patch)).await
    }

    #[instrument(skip(self), fields(table = %query.table))]
    async fn delete(&self, query: &Query) -> Result<Vec<Value>, BaasError> {
        let url = self.url_for(query)?;
        self.send(Method::DELETE, url, None).await
    }

    fn subscribe(&self, table: Table, filter: EventFilter) -> Subscription {
        self.inner.hub.subscribe(table, filter)
    }

    fn subscribe_many(&self, tables: &[Table]) -> Subscription {
        self.inner.hub.subscribe_many(tables)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> RestClient {
        RestClient::new(&BaasConfig::new(
            "https://proj.example.co/",
            SecretString::from("service-key".to_string()),
        ))
        .unwrap()
    }

    #[test]
    fn test_url_for_encodes_filters() {
        let query = Query::table(Table::Orders)
            .eq("user_id", "abc")
            .order("created_at", true);
        let url = client().url_for(&query).unwrap();
        assert_eq!(url.path(), "/rest/v1/orders");
        assert_eq!(
            url.query(),
            Some("user_id=eq.abc&order=created_at.desc")
        );
    }

    #[test]
    fn test_url_for_plain_table() {
        let url = client().url_for(&Query::table(Table::DomainExtensions)).unwrap();
        assert_eq!(url.as_str(), "https://proj.example.co/rest/v1/domain_extensions");
    }

    #[test]
    fn test_api_error_message_prefers_body_message() {
        let body = r#"{"code":"23505","message":"duplicate key value","details":"Key (id) exists"}"#;
        assert_eq!(
            api_error_message(StatusCode::CONFLICT, body),
            "duplicate key value: Key (id) exists"
        );
        assert_eq!(api_error_message(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
        assert_eq!(api_error_message(StatusCode::BAD_REQUEST, "oops"), "oops");
    }
}

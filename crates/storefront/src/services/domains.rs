//! Domain search.
//!
//! A search validates the candidate, prices it from the active extension
//! table and checks availability against registered `domains` rows. Names
//! are reported as taken only if a row exists for them; there is no WHOIS
//! lookup.

use std::collections::HashSet;
use std::sync::Arc;

use angohost_baas::{Baas, BaasError, Query, Repository};
use angohost_core::models::{Domain, DomainExtension};
use angohost_core::{DomainName, DomainNameError, Table};
use rust_decimal::Decimal;
use serde::Serialize;

/// Extension tried when the visitor types a bare label.
pub const DEFAULT_EXTENSION: &str = ".ao";

/// One name in a search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainOption {
    pub name: DomainName,
    pub extension: String,
    pub register_price: Decimal,
    pub transfer_price: Option<Decimal>,
    pub available: bool,
}

/// Result of searching for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainSearch {
    /// The exact name asked for; `None` when its extension is not sold.
    pub requested: Option<DomainOption>,
    /// The same label under the other active extensions.
    pub suggestions: Vec<DomainOption>,
}

/// Why a search produced no result.
#[derive(Debug, thiserror::Error)]
pub enum DomainSearchError {
    #[error(transparent)]
    Invalid(#[from] DomainNameError),

    #[error("{0}")]
    Baas(#[from] BaasError),
}

/// Normalize a typed candidate into a domain name.
///
/// A bare label gets [`DEFAULT_EXTENSION`].
///
/// # Errors
///
/// Returns [`DomainNameError`] if the result is not a valid name.
pub fn normalize_candidate(input: &str) -> Result<DomainName, DomainNameError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.contains('.') {
        DomainName::parse(trimmed)
    } else {
        DomainName::from_parts(trimmed, DEFAULT_EXTENSION)
    }
}

/// Search for `input` and its siblings across active extensions.
///
/// # Errors
///
/// Returns an error for malformed input or when the catalogue cannot be read.
#[tracing::instrument(skip(baas))]
pub async fn search(baas: &Arc<dyn Baas>, input: &str) -> Result<DomainSearch, DomainSearchError> {
    let name = normalize_candidate(input)?;
    let (label, requested_ext) = name.split_extension();

    let extensions: Vec<DomainExtension> = Repository::new(Arc::clone(baas))
        .list_where(Repository::<DomainExtension>::query().eq("is_active", true))
        .await?;

    let mut candidates: Vec<(DomainName, &DomainExtension)> = Vec::new();
    for ext in &extensions {
        if let Ok(candidate) = DomainName::from_parts(label, &ext.extension) {
            candidates.push((candidate, ext));
        }
    }
    if candidates.is_empty() {
        return Ok(DomainSearch {
            requested: None,
            suggestions: Vec::new(),
        });
    }

    let names: Vec<&str> = candidates.iter().map(|(n, _)| n.as_str()).collect();
    let taken: HashSet<String> = Repository::<Domain>::new(Arc::clone(baas))
        .list_where(Query::table(Table::Domains).in_list("domain_name", &names))
        .await?
        .into_iter()
        .map(|d| d.domain_name.to_lowercase())
        .collect();

    let mut requested = None;
    let mut suggestions = Vec::new();
    for (candidate, ext) in candidates {
        let option = DomainOption {
            available: !taken.contains(candidate.as_str()),
            extension: ext.extension.clone(),
            register_price: ext.register_price,
            transfer_price: ext.transfer_price,
            name: candidate,
        };
        if normalized_ext(&ext.extension) == requested_ext {
            requested = Some(option);
        } else {
            suggestions.push(option);
        }
    }

    Ok(DomainSearch {
        requested,
        suggestions,
    })
}

/// Look up the active extension row pricing `name`.
///
/// # Errors
///
/// Returns an error if the catalogue cannot be read.
pub async fn extension_for(
    baas: &Arc<dyn Baas>,
    name: &DomainName,
) -> Result<Option<DomainExtension>, BaasError> {
    let (_, ext) = name.split_extension();
    let rows: Vec<DomainExtension> = Repository::new(Arc::clone(baas))
        .list_where(Repository::<DomainExtension>::query().eq("is_active", true))
        .await?;
    Ok(rows
        .into_iter()
        .find(|row| normalized_ext(&row.extension) == ext))
}

fn normalized_ext(extension: &str) -> String {
    format!(".{}", extension.trim().trim_start_matches('.').to_lowercase())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use angohost_baas::MemoryBaas;
    use serde_json::json;

    use super::*;

    async fn catalogue() -> (Arc<MemoryBaas>, Arc<dyn Baas>) {
        let memory = Arc::new(MemoryBaas::new());
        memory
            .seed(
                Table::DomainExtensions,
                [
                    json!({"extension": ".ao", "register_price": "25000", "renew_price": "25000", "transfer_price": null, "is_active": true}),
                    json!({"extension": ".co.ao", "register_price": "19900", "renew_price": "19900", "transfer_price": "15000", "is_active": true}),
                    json!({"extension": ".com", "register_price": "12000", "renew_price": "12000", "transfer_price": "9000", "is_active": true}),
                    json!({"extension": ".net", "register_price": "14000", "renew_price": "14000", "transfer_price": null, "is_active": false}),
                ],
            )
            .await;
        let baas: Arc<dyn Baas> = memory.clone();
        (memory, baas)
    }

    #[test]
    fn test_bare_label_defaults_to_ao() {
        assert_eq!(normalize_candidate("angohost").unwrap().as_str(), "angohost.ao");
        assert_eq!(normalize_candidate("loja.com").unwrap().as_str(), "loja.com");
        assert!(normalize_candidate("-bad-").is_err());
        assert!(normalize_candidate("a..com").is_err());
    }

    #[tokio::test]
    async fn test_search_prices_requested_and_suggests_active_siblings() {
        let (_memory, baas) = catalogue().await;
        let result = search(&baas, "loja.co.ao").await.unwrap();

        let requested = result.requested.unwrap();
        assert_eq!(requested.name.as_str(), "loja.co.ao");
        assert_eq!(requested.register_price, Decimal::from(19_900));
        assert!(requested.available);

        let names: Vec<&str> = result.suggestions.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"loja.ao"));
        assert!(names.contains(&"loja.com"));
        assert!(!names.contains(&"loja.net"));
    }

    #[tokio::test]
    async fn test_search_marks_registered_names_taken() {
        let (memory, baas) = catalogue().await;
        memory
            .seed(
                Table::Domains,
                [json!({
                    "user_id": "0c9d8e7f-6a5b-4c3d-2e1f-0a9b8c7d6e5f",
                    "domain_name": "loja.ao",
                    "status": "active"
                })],
            )
            .await;

        let result = search(&baas, "loja").await.unwrap();
        assert!(!result.requested.unwrap().available);
        assert!(result.suggestions.iter().all(|o| o.available));
    }

    #[tokio::test]
    async fn test_search_unsold_extension() {
        let (_memory, baas) = catalogue().await;
        let result = search(&baas, "loja.net").await.unwrap();
        assert!(result.requested.is_none());
        assert_eq!(result.suggestions.len(), 3);
    }

    #[tokio::test]
    async fn test_extension_for() {
        let (_memory, baas) = catalogue().await;
        let name = DomainName::parse("x-loja.com").unwrap();
        let ext = extension_for(&baas, &name).await.unwrap().unwrap();
        assert_eq!(ext.register_price, Decimal::from(12_000));
        let name = DomainName::parse("x-loja.net").unwrap();
        assert!(extension_for(&baas, &name).await.unwrap().is_none());
    }
}

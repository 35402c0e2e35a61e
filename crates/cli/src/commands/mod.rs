//! Command implementations.
//!
//! Commands that touch data connect to the hosted BaaS with the service key
//! from `BAAS_URL` / `BAAS_SERVICE_KEY`, the same settings the admin uses.

pub mod invoices;
pub mod nif;
pub mod smtp;
pub mod users;

use std::sync::Arc;

use angohost_admin::config::{ConfigError, baas_from_env};
use angohost_baas::{Baas, BaasError, RestClient};
use angohost_storefront::services::NifLookupError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Missing or invalid environment.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// BaaS request failed.
    #[error("BaaS error: {0}")]
    Baas(#[from] BaasError),

    /// No profile matched the given email or id.
    #[error("No user found for {0}")]
    UserNotFound(String),

    /// Unknown role name.
    #[error("Invalid role: {0}. Valid roles: admin, support, finance, customer")]
    InvalidRole(String),

    /// NIF lookup failed.
    #[error(transparent)]
    Nif(#[from] NifLookupError),

    /// SMTP test failed.
    #[error("SMTP test failed: {0}")]
    Smtp(String),
}

/// Connect to the hosted BaaS.
///
/// # Errors
///
/// Returns an error if the environment is incomplete or the HTTP client
/// cannot be built.
pub fn connect() -> Result<Arc<dyn Baas>, CommandError> {
    let config = baas_from_env()?;
    tracing::debug!(url = %config.url, "Connecting to BaaS");
    Ok(Arc::new(RestClient::new(&config)?))
}

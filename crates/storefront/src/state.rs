//! Application state shared across handlers.

use std::sync::Arc;

use angohost_baas::{Auth, Baas, BaasError, IdentityClient, RestClient};

use crate::config::StorefrontConfig;
use crate::services::{EmailService, NifClient};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The BaaS and identity backends sit behind
/// trait objects so tests can run the full router against in-memory
/// implementations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    baas: Arc<dyn Baas>,
    auth: Arc<dyn Auth>,
    nif: NifClient,
    email: Option<EmailService>,
}

impl AppState {
    /// Create state over explicit backends.
    ///
    /// The NIF client and (when SMTP is configured) the email service are
    /// built from `config`.
    #[must_use]
    pub fn new(config: StorefrontConfig, baas: Arc<dyn Baas>, auth: Arc<dyn Auth>) -> Self {
        let nif = NifClient::new(&config.nif);
        let email = config.smtp.as_ref().and_then(|smtp| {
            EmailService::new(smtp, &config.base_url)
                .inspect_err(|e| tracing::warn!(error = %e, "Order emails disabled"))
                .ok()
        });

        Self {
            inner: Arc::new(AppStateInner {
                config,
                baas,
                auth,
                nif,
                email,
            }),
        }
    }

    /// Create state talking to the hosted BaaS.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP clients cannot be built.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, BaasError> {
        let baas: Arc<dyn Baas> = Arc::new(RestClient::new(&config.baas)?);
        let auth: Arc<dyn Auth> = Arc::new(IdentityClient::new(&config.baas)?);
        Ok(Self::new(config, baas, auth))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The BaaS query interface.
    #[must_use]
    pub fn baas(&self) -> &Arc<dyn Baas> {
        &self.inner.baas
    }

    /// The identity backend.
    #[must_use]
    pub fn auth(&self) -> &dyn Auth {
        self.inner.auth.as_ref()
    }

    /// NIF registry client.
    #[must_use]
    pub fn nif(&self) -> &NifClient {
        &self.inner.nif
    }

    /// Order email sender, if SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }
}

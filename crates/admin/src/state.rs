//! Application state shared across handlers.

use std::sync::Arc;

use angohost_baas::{Auth, Baas, BaasError, IdentityClient, Repository, RestClient, realtime};
use angohost_core::{Entity, Table};

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    baas: Arc<dyn Baas>,
    auth: Arc<dyn Auth>,
}

impl AppState {
    /// Create state over explicit backends.
    #[must_use]
    pub fn new(config: AdminConfig, baas: Arc<dyn Baas>, auth: Arc<dyn Auth>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, baas, auth }),
        }
    }

    /// Create state talking to the hosted BaaS and start the realtime
    /// listener for every table.
    ///
    /// Must be called from inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP clients cannot be built.
    pub fn from_config(config: AdminConfig) -> Result<Self, BaasError> {
        let rest = RestClient::new(&config.baas)?;
        tokio::spawn(realtime::listen(
            config.baas.clone(),
            Table::ALL.to_vec(),
            rest.hub(),
        ));

        let baas: Arc<dyn Baas> = Arc::new(rest);
        let auth: Arc<dyn Auth> = Arc::new(IdentityClient::new(&config.baas)?);
        Ok(Self::new(config, baas, auth))
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
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

    /// Typed repository over the table of `E`.
    #[must_use]
    pub fn repo<E: Entity>(&self) -> Repository<E> {
        Repository::new(Arc::clone(&self.inner.baas))
    }
}

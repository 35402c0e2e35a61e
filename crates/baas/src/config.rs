//! Connection settings shared by every BaaS client.

use std::time::Duration;

use secrecy::SecretString;

/// Default request timeout for REST and identity calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the BaaS lives and how to authenticate against it.
#[derive(Debug, Clone)]
pub struct BaasConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Service key sent as `apikey` and bearer token.
    pub service_key: SecretString,
    /// Timeout applied to every HTTP request.
    pub timeout: Duration,
}

impl BaasConfig {
    #[must_use]
    pub fn new(url: impl Into<String>, service_key: SecretString) -> Self {
        Self {
            url: url.into(),
            service_key,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Base URL with exactly one trailing slash, ready for `Url::join`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}/", self.url.trim_end_matches('/'))
    }
}

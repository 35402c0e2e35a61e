//! Identity delegated to the BaaS.
//!
//! Passwords are never seen by application storage: sign-in and sign-up go
//! straight to the BaaS identity endpoints, and the application only keeps
//! the returned user id in its session. Profiles (role, activation, contact
//! data) are ordinary rows in the `profiles` table keyed by the same id.

use std::collections::HashMap;
use std::sync::Arc;

use angohost_core::UserId;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{instrument, warn};
use url::Url;

use crate::config::BaasConfig;
use crate::error::BaasError;

/// The identity returned by a successful sign-in or sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

/// Identity operations.
#[async_trait]
pub trait Auth: Send + Sync {
    /// Check an email/password pair.
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<AuthUser, BaasError>;

    /// Create a new identity.
    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<AuthUser, BaasError>;

    /// Remove an identity. Requires the service key.
    async fn delete_user(&self, id: UserId) -> Result<(), BaasError>;
}

// =============================================================================
// HTTP identity client
// =============================================================================

/// Client for the `/auth/v1` endpoints.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    auth_base: Url,
    service_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    #[serde(default)]
    user: Option<UserBody>,
    // sign-up without email confirmation returns the user at top level
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    #[serde(default, alias = "error_description", alias = "msg")]
    message: Option<String>,
}

impl IdentityClient {
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: &BaasConfig) -> Result<Self, BaasError> {
        let auth_base = Url::parse(&config.base_url())?.join("auth/v1/")?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(IdentityClientInner {
                client,
                auth_base,
                service_key: config.service_key.clone(),
            }),
        })
    }

    async fn post_credentials(
        &self,
        url: Url,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthUser, BaasError> {
        let key = self.inner.service_key.expose_secret();
        let response = self
            .inner
            .client
            .post(url)
            .header("apikey", key)
            .json(&json!({ "email": email, "password": password.expose_secret() }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<AuthErrorBody>(&text)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| "invalid login credentials".to_string());
            warn!(status = %status, "Identity request rejected");
            return Err(BaasError::Auth(message));
        }

        let body: SessionBody = serde_json::from_str(&text)?;
        let (id, user_email) = match body.user {
            Some(user) => (user.id, user.email),
            None => (
                body.id
                    .ok_or_else(|| BaasError::Auth("response carried no user".to_string()))?,
                body.email,
            ),
        };
        let id = id
            .parse::<UserId>()
            .map_err(|e| BaasError::Auth(format!("invalid user id: {e}")))?;
        Ok(AuthUser {
            id,
            email: user_email.unwrap_or_else(|| email.to_string()),
        })
    }
}

#[async_trait]
impl Auth for IdentityClient {
    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<AuthUser, BaasError> {
        let url = self.inner.auth_base.join("token?grant_type=password")?;
        self.post_credentials(url, email, password).await
    }

    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<AuthUser, BaasError> {
        let url = self.inner.auth_base.join("signup")?;
        self.post_credentials(url, email, password).await
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: UserId) -> Result<(), BaasError> {
        let url = self.inner.auth_base.join(&format!("admin/users/{id}"))?;
        let key = self.inner.service_key.expose_secret();
        let response = self
            .inner
            .client
            .delete(url)
            .header("apikey", key)
            .bearer_auth(key)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(BaasError::Api {
                status: status.as_u16(),
                message: serde_json::from_str::<AuthErrorBody>(&text)
                    .ok()
                    .and_then(|b| b.message)
                    .unwrap_or_else(|| format!("could not delete identity {id}")),
            })
        }
    }
}

// =============================================================================
// In-memory identities
// =============================================================================

/// In-process identity store for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryAuth {
    users: RwLock<HashMap<String, (SecretString, UserId)>>,
}

impl MemoryAuth {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an identity with a known id.
    pub async fn add_user(&self, id: UserId, email: &str, password: &str) {
        self.users.write().await.insert(
            email.to_lowercase(),
            (SecretString::from(password.to_string()), id),
        );
    }

    pub async fn contains(&self, id: UserId) -> bool {
        self.users.read().await.values().any(|(_, uid)| *uid == id)
    }
}

#[async_trait]
impl Auth for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<AuthUser, BaasError> {
        let email = email.to_lowercase();
        match self.users.read().await.get(&email) {
            Some((stored, id)) if stored.expose_secret() == password.expose_secret() => {
                Ok(AuthUser { id: *id, email })
            }
            _ => Err(BaasError::Auth("invalid login credentials".to_string())),
        }
    }

    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<AuthUser, BaasError> {
        let email = email.to_lowercase();
        let mut users = self.users.write().await;
        if users.contains_key(&email) {
            return Err(BaasError::Auth("user already registered".to_string()));
        }
        let id = UserId::generate();
        users.insert(email.clone(), (password.clone(), id));
        Ok(AuthUser { id, email })
    }

    async fn delete_user(&self, id: UserId) -> Result<(), BaasError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|_, (_, uid)| *uid != id);
        if users.len() == before {
            Err(BaasError::NotFound(format!("user {id}")))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[tokio::test]
    async fn test_memory_sign_up_then_sign_in() {
        let auth = MemoryAuth::new();
        let user = auth
            .sign_up("Cliente@Example.ao", &secret("s3cret-pass"))
            .await
            .unwrap();
        assert_eq!(user.email, "cliente@example.ao");

        let signed_in = auth
            .sign_in("cliente@example.ao", &secret("s3cret-pass"))
            .await
            .unwrap();
        assert_eq!(signed_in.id, user.id);

        assert!(auth.sign_in("cliente@example.ao", &secret("wrong")).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_duplicate_sign_up_rejected() {
        let auth = MemoryAuth::new();
        auth.sign_up("a@b.ao", &secret("x")).await.unwrap();
        assert!(matches!(
            auth.sign_up("a@b.ao", &secret("y")).await,
            Err(BaasError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_delete_user() {
        let auth = MemoryAuth::new();
        let id = UserId::generate();
        auth.add_user(id, "staff@angohost.ao", "pw").await;
        assert!(auth.contains(id).await);
        auth.delete_user(id).await.unwrap();
        assert!(!auth.contains(id).await);
        assert!(auth.delete_user(id).await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_identity_client_builds() {
        let config = BaasConfig::new("http://localhost:54321", secret("k"));
        assert!(IdentityClient::new(&config).is_ok());
    }
}

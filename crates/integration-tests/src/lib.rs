//! Integration tests for AngoHost.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p angohost-integration-tests
//! ```
//!
//! Each test starts the storefront and the admin on ephemeral local ports,
//! both backed by the same in-memory BaaS, and drives them over HTTP with a
//! cookie-keeping client. No external services are needed.
//!
//! # Test Categories
//!
//! - `storefront_checkout` - cart to order, as a customer sees it
//! - `admin_users` - staff sign-in and user management
//! - `shared_backend` - changes made in one app as seen from the other

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use angohost_admin::config::AdminConfig;
use angohost_baas::{Auth, Baas, BaasConfig, MemoryAuth, MemoryBaas};
use angohost_core::{Table, UserId};
use axum::Router;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::SecretString;
use serde_json::json;
use tokio::net::TcpListener;

/// Password given to every seeded identity.
pub const PASSWORD: &str = "kianda-2025";

/// Both apps running against one shared backend.
pub struct TestContext {
    pub baas: Arc<MemoryBaas>,
    pub auth: Arc<MemoryAuth>,
    pub storefront_url: String,
    pub admin_url: String,
}

impl TestContext {
    /// Start the storefront and the admin.
    ///
    /// # Panics
    ///
    /// Panics if a local port cannot be bound.
    pub async fn start() -> Self {
        let baas = Arc::new(MemoryBaas::new());
        let auth = Arc::new(MemoryAuth::new());
        let baas_config = BaasConfig::new(
            "http://localhost:54321",
            SecretString::from("integration-service-key".to_string()),
        );

        let storefront = angohost_storefront::app(angohost_storefront::state::AppState::new(
            angohost_storefront::config::StorefrontConfig::local(baas_config.clone()),
            Arc::clone(&baas) as Arc<dyn Baas>,
            Arc::clone(&auth) as Arc<dyn Auth>,
        ));
        let admin = angohost_admin::app(angohost_admin::state::AppState::new(
            AdminConfig::local(baas_config),
            Arc::clone(&baas) as Arc<dyn Baas>,
            Arc::clone(&auth) as Arc<dyn Auth>,
        ));

        Self {
            storefront_url: serve(storefront).await,
            admin_url: serve(admin).await,
            baas,
            auth,
        }
    }

    /// A client with its own cookie jar that does not follow redirects.
    ///
    /// Each client presents a distinct forwarded address so the auth rate
    /// limiter treats them as different visitors.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self) -> reqwest::Client {
        static NEXT_ADDRESS: AtomicU8 = AtomicU8::new(1);
        let address = format!("198.51.100.{}", NEXT_ADDRESS.fetch_add(1, Ordering::Relaxed));

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_str(&address).expect("valid header value"),
        );
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .default_headers(headers)
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Seed an identity and profile; returns the profile id.
    pub async fn add_user(&self, email: &str, role: &str) -> UserId {
        let id = UserId::generate();
        self.auth.add_user(id, email, PASSWORD).await;
        self.baas
            .seed(
                Table::Profiles,
                [json!({"id": id, "email": email, "role": role, "is_active": true})],
            )
            .await;
        id
    }

    /// Seed the `.ao` extension and one active payment method.
    pub async fn seed_catalogue(&self) {
        self.baas
            .seed(
                Table::DomainExtensions,
                [json!({"extension": ".ao", "register_price": "19900", "renew_price": "19900", "transfer_price": null, "is_active": true})],
            )
            .await;
        self.baas
            .seed(
                Table::PaymentMethods,
                [json!({"name": "Transferência bancária", "kind": "bank_transfer", "instructions": "IBAN AO06 0000 0000 0000 0000 0000 0", "is_active": true})],
            )
            .await;
    }

    /// Sign `client` in to the storefront.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn storefront_sign_in(&self, client: &reqwest::Client, email: &str, next: &str) -> reqwest::Response {
        client
            .post(format!("{}/auth/login", self.storefront_url))
            .form(&[("email", email), ("password", PASSWORD), ("next", next)])
            .send()
            .await
            .expect("storefront sign-in request")
    }

    /// Sign `client` in to the admin.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn admin_sign_in(&self, client: &reqwest::Client, email: &str) -> reqwest::Response {
        client
            .post(format!("{}/auth/login", self.admin_url))
            .form(&[("email", email), ("password", PASSWORD)])
            .send()
            .await
            .expect("admin sign-in request")
    }
}

/// Location header of a redirect, or an empty string.
#[must_use]
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}")
}

//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//! GET  /hosting                - Hosting plans
//! GET  /email                  - Email plans
//! GET  /vps                    - VPS plans
//! GET  /domains?q=             - Domain search
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/domain            - Add domain registration
//! POST /cart/transfer          - Add domain transfer
//! POST /cart/plan              - Add plan
//! POST /cart/update            - Update quantity
//! POST /cart/remove            - Remove item
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Review and choose payment method
//! POST /checkout               - Submit order
//! GET  /checkout/confirmation/{order_number}
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Account overview
//! GET  /account/orders         - Order history
//! GET  /account/invoices       - Invoices
//! GET  /account/domains        - Domains
//! GET  /account/services       - Services
//! GET  /account/tickets        - Tickets
//! POST /account/tickets        - Open ticket
//! GET  /account/profile        - Profile form
//! POST /account/profile        - Save profile
//!
//! # API
//! GET  /api/nif/{nif}          - NIF registry lookup (rate limited)
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod domains;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route_layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/domain", post(cart::add_domain))
        .route("/transfer", post(cart::add_transfer))
        .route("/plan", post(cart::add_plan))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::submit))
        .route("/confirmation/{order_number}", get(checkout::confirmation))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/orders", get(account::orders))
        .route("/invoices", get(account::invoices))
        .route("/domains", get(account::domains))
        .route("/services", get(account::services))
        .route(
            "/tickets",
            get(account::tickets).post(account::create_ticket),
        )
        .route(
            "/profile",
            get(account::profile).post(account::update_profile),
        )
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/nif/{nif}", get(api::nif_lookup))
        .route_layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(home::health))
        .route("/hosting", get(home::hosting))
        .route("/email", get(home::email))
        .route("/vps", get(home::vps))
        .route("/domains", get(domains::search))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
}

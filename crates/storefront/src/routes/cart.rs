//! Cart route handlers.
//!
//! The cart lives in the session. Every mutation loads it, applies one cart
//! operation, stores it back, queues a notice and redirects to `/cart`.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use angohost_baas::Repository;
use angohost_core::models::ServicePlan;
use angohost_core::{BillingCycle, Cart, CartItem, DomainName, Notice, ServicePlanId};

use crate::filters;
use crate::page::PageContext;
use crate::services::{cart, domains, notices};
use crate::state::AppState;

/// Longest registration period sold.
pub const MAX_DOMAIN_YEARS: u32 = 10;

// =============================================================================
// Form Types
// =============================================================================

/// Add a domain registration.
#[derive(Debug, Deserialize)]
pub struct AddDomainForm {
    pub domain: String,
    #[serde(default = "one")]
    pub years: u32,
}

/// Add a domain transfer.
#[derive(Debug, Deserialize)]
pub struct AddTransferForm {
    pub domain: String,
}

/// Add a hosting, email or VPS plan.
#[derive(Debug, Deserialize)]
pub struct AddPlanForm {
    pub plan_id: ServicePlanId,
    pub cycle: BillingCycle,
    #[serde(default = "one")]
    pub periods: u32,
    #[serde(default)]
    pub domain: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
}

const fn one() -> u32 {
    1
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: Cart,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Helpers
// =============================================================================

/// Store `cart`, queue `notice` and go back to the cart page.
async fn save_and_redirect(session: &Session, cart: &Cart, notice: Notice) -> Response {
    let notice = match cart::save(session, cart).await {
        Ok(()) => notice,
        Err(e) => {
            warn!(error = %e, "Failed to save cart");
            Notice::error("Could not update your cart. Please try again.")
        }
    };
    notices::push(session, notice).await;
    Redirect::to("/cart").into_response()
}

async fn reject(session: &Session, message: impl Into<String>, back: &str) -> Response {
    notices::push(session, Notice::error(message)).await;
    Redirect::to(back).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
pub async fn show(session: Session, page: PageContext) -> impl IntoResponse {
    CartShowTemplate {
        page,
        cart: cart::load(&session).await,
    }
}

/// Cart badge count.
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: cart::load(&session).await.item_count(),
    }
}

/// Add a domain registration priced from the extension table.
#[instrument(skip(state, session))]
pub async fn add_domain(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddDomainForm>,
) -> Response {
    let back = format!("/domains?q={}", urlencoding::encode(form.domain.trim()));
    let name = match DomainName::parse(&form.domain) {
        Ok(name) => name,
        Err(e) => return reject(&session, e.to_string(), "/domains").await,
    };
    if !(1..=MAX_DOMAIN_YEARS).contains(&form.years) {
        return reject(
            &session,
            format!("Domains can be registered for 1 to {MAX_DOMAIN_YEARS} years"),
            &back,
        )
        .await;
    }

    let extension = match domains::extension_for(state.baas(), &name).await {
        Ok(Some(extension)) => extension,
        Ok(None) => {
            return reject(&session, format!("We don't sell {name} yet"), &back).await;
        }
        Err(e) => return reject(&session, e.to_string(), &back).await,
    };

    let mut cart = cart::load(&session).await;
    let notice = cart.add(CartItem::domain_registration(
        &name,
        form.years,
        extension.register_price,
    ));
    save_and_redirect(&session, &cart, notice).await
}

/// Add a domain transfer.
#[instrument(skip(state, session))]
pub async fn add_transfer(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddTransferForm>,
) -> Response {
    let name = match DomainName::parse(&form.domain) {
        Ok(name) => name,
        Err(e) => return reject(&session, e.to_string(), "/domains").await,
    };
    let price = match domains::extension_for(state.baas(), &name).await {
        Ok(Some(extension)) => extension.transfer_price,
        Ok(None) => None,
        Err(e) => return reject(&session, e.to_string(), "/domains").await,
    };
    let Some(price) = price else {
        return reject(
            &session,
            format!("Transfers are not available for {name}"),
            "/domains",
        )
        .await;
    };

    let mut cart = cart::load(&session).await;
    let notice = cart.add(CartItem::domain_transfer(&name, price));
    save_and_redirect(&session, &cart, notice).await
}

/// Add a plan at the chosen billing cycle.
#[instrument(skip(state, session))]
pub async fn add_plan(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddPlanForm>,
) -> Response {
    let domain = match form.domain.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => match DomainName::parse(d) {
            Ok(name) => Some(name),
            Err(e) => return reject(&session, e.to_string(), "/hosting").await,
        },
        None => None,
    };

    let plan = match Repository::<ServicePlan>::new(Arc::clone(state.baas()))
        .find(form.plan_id)
        .await
    {
        Ok(Some(plan)) if plan.is_active => plan,
        Ok(_) => return reject(&session, "That plan is no longer available", "/hosting").await,
        Err(e) => return reject(&session, e.to_string(), "/hosting").await,
    };

    let mut cart = cart::load(&session).await;
    let notice = cart.add(CartItem::plan(
        &plan,
        form.cycle,
        form.periods,
        domain.as_ref(),
    ));
    save_and_redirect(&session, &cart, notice).await
}

/// Change a line's quantity. Quantities below one are ignored without a
/// notice.
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Response {
    if form.quantity < 1 {
        return Redirect::to("/cart").into_response();
    }
    let mut cart = cart::load(&session).await;
    let notice = if cart.update_quantity(&form.id, form.quantity) {
        Notice::success("Cart updated")
    } else {
        Notice::error("That item is no longer in your cart")
    };
    save_and_redirect(&session, &cart, notice).await
}

/// Remove a line.
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Response {
    let mut cart = cart::load(&session).await;
    let notice = if cart.remove(&form.id) {
        Notice::info("Item removed from cart")
    } else {
        Notice::error("That item is no longer in your cart")
    };
    save_and_redirect(&session, &cart, notice).await
}

/// Empty the cart.
pub async fn clear(session: Session) -> Response {
    let mut cart = cart::load(&session).await;
    cart.clear();
    save_and_redirect(&session, &cart, Notice::info("Cart cleared")).await
}

//! Checkout route handlers.
//!
//! ```text
//! GET  /checkout                            - Review cart, choose payment method
//! POST /checkout                            - Submit order
//! GET  /checkout/confirmation/{order_number} - Order placed
//! ```

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use angohost_baas::Repository;
use angohost_core::models::{Order, PaymentMethod};
use angohost_core::{Cart, Notice, Table};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::auth::login_redirect;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::page::PageContext;
use crate::services::checkout::{CheckoutError, record_abandoned_cart, submit_order};
use crate::services::{cart, notices};
use crate::state::AppState;

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub cart: Cart,
    pub payment_methods: Vec<PaymentMethod>,
    pub login_url: String,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub page: PageContext,
    pub order: Order,
    pub payment_method: Option<PaymentMethod>,
}

async fn active_payment_methods(state: &AppState) -> Vec<PaymentMethod> {
    Repository::<PaymentMethod>::new(Arc::clone(state.baas()))
        .list_where(Repository::<PaymentMethod>::query().eq("is_active", true))
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load payment methods");
            Vec::new()
        })
}

/// Review the cart before ordering.
///
/// Signed-in visitors get an abandoned-cart row recorded, which is marked
/// recovered once they order.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    page: PageContext,
) -> Response {
    let cart = cart::load(&session).await;
    if cart.is_empty() {
        notices::push(&session, CheckoutError::EmptyCart.notice()).await;
        return Redirect::to("/cart").into_response();
    }

    if let Some(user) = &user {
        if let Err(e) = record_abandoned_cart(state.baas(), user.id, &cart).await {
            warn!(error = %e, user_id = %user.id, "Failed to record abandoned cart");
        }
    }

    CheckoutTemplate {
        page,
        cart,
        payment_methods: active_payment_methods(&state).await,
        login_url: login_redirect("/checkout"),
    }
    .into_response()
}

/// Submit the order.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let mut cart = cart::load(&session).await;

    let result = submit_order(
        state.baas(),
        &mut cart,
        user.as_ref().map(|u| u.id),
        form.payment_method,
        Utc::now(),
    )
    .await;

    let order = match result {
        Ok(order) => order,
        Err(e) => {
            let target = match &e {
                CheckoutError::EmptyCart => "/cart".to_string(),
                CheckoutError::NotAuthenticated => login_redirect("/checkout"),
                CheckoutError::MissingPaymentMethod
                | CheckoutError::UnavailablePaymentMethod
                | CheckoutError::Write(_) => {
                    "/checkout".to_string()
                }
            };
            if let CheckoutError::Write(inner) = &e {
                warn!(error = %inner, "Order write failed");
            }
            notices::push(&session, e.notice()).await;
            return Redirect::to(&target).into_response();
        }
    };

    if let Err(e) = cart::save(&session, &cart).await {
        warn!(error = %e, "Failed to clear cart after order");
    }
    if let Some(user) = user {
        send_confirmation(&state, user, order.clone());
    }

    notices::push(
        &session,
        Notice::success(format!("Order {} placed", order.order_number)),
    )
    .await;
    Redirect::to(&format!("/checkout/confirmation/{}", order.order_number)).into_response()
}

/// Email the confirmation in the background; failures are only logged.
fn send_confirmation(state: &AppState, user: CurrentUser, order: Order) {
    let Some(email) = state.email().cloned() else {
        return;
    };
    tokio::spawn(async move {
        if let Err(e) = email
            .send_order_confirmation(&user.email, user.display_name(), &order)
            .await
        {
            warn!(error = %e, order_number = %order.order_number, "Order email failed");
        }
    });
}

/// Show a placed order with its payment instructions.
#[instrument(skip(state, user, page))]
pub async fn confirmation(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
    Path(order_number): Path<String>,
) -> Result<impl IntoResponse> {
    let orders: Vec<Order> = Repository::new(Arc::clone(state.baas()))
        .list_where(
            angohost_baas::Query::table(Table::Orders)
                .eq("order_number", &order_number)
                .eq("user_id", user.id)
                .limit(1),
        )
        .await?;
    let order = orders
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("order {order_number}")))?;

    let payment_method = match order.payment_method.as_deref() {
        Some(name) => active_payment_methods(&state)
            .await
            .into_iter()
            .find(|m| m.name == name),
        None => None,
    };

    Ok(ConfirmationTemplate {
        page,
        order,
        payment_method,
    })
}

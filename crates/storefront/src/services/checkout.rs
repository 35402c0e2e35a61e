//! Order submission.
//!
//! Preconditions are checked in a fixed order (cart, user, payment method)
//! and the first one missing aborts before anything is written. The payment
//! method must name an active `payment_methods` row. A submitted
//! order is a single `orders` row with an embedded snapshot of the cart
//! lines; there is no reservation, payment capture or rollback.

use std::sync::Arc;

use angohost_baas::{Baas, BaasError, Query, Repository};
use angohost_core::models::{
    AbandonedCart, NewAbandonedCart, NewOrder, Order, OrderItem, PaymentMethod,
};
use angohost_core::models::order::generate_order_number;
use angohost_core::{Cart, Notice, Table, UserId};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Reasons an order was not placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please sign in to complete your order")]
    NotAuthenticated,

    #[error("Please choose a payment method")]
    MissingPaymentMethod,

    #[error("That payment method is not available")]
    UnavailablePaymentMethod,

    /// The order row could not be written; carries the backend's message.
    #[error("{0}")]
    Write(#[from] BaasError),
}

impl CheckoutError {
    /// The notice shown to the visitor.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::NotAuthenticated => Notice::info(self.to_string()),
            _ => Notice::error(self.to_string()),
        }
    }
}

/// Submit the cart as an order for `user_id`.
///
/// On success the cart is cleared and the stored order returned. A prior
/// abandoned-cart row for the user is marked recovered; failure to do so is
/// logged and otherwise ignored.
///
/// # Errors
///
/// Returns the first missing precondition, or [`CheckoutError::Write`] if
/// the order insert fails. In every error case nothing was written and the
/// cart is unchanged.
#[instrument(skip(baas, cart), fields(items = cart.items().len()))]
pub async fn submit_order(
    baas: &Arc<dyn Baas>,
    cart: &mut Cart,
    user_id: Option<UserId>,
    payment_method: Option<String>,
    now: DateTime<Utc>,
) -> Result<Order, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let user_id = user_id.ok_or(CheckoutError::NotAuthenticated)?;
    let payment_method = payment_method
        .filter(|m| !m.trim().is_empty())
        .ok_or(CheckoutError::MissingPaymentMethod)?;
    let method = active_payment_method(baas, payment_method.trim())
        .await?
        .ok_or(CheckoutError::UnavailablePaymentMethod)?;

    let new_order = NewOrder::from_cart(
        user_id,
        generate_order_number(now),
        cart.items(),
        Some(method.name),
    );
    let order: Order = Repository::new(Arc::clone(baas)).create(&new_order).await?;
    info!(order_number = %order.order_number, total = %order.total_amount, "Order placed");

    if let Err(e) = mark_cart_recovered(baas, user_id, now).await {
        warn!(error = %e, user_id = %user_id, "Failed to mark abandoned cart recovered");
    }

    cart.clear();
    Ok(order)
}

/// The active payment method called `name`, if any.
async fn active_payment_method(
    baas: &Arc<dyn Baas>,
    name: &str,
) -> Result<Option<PaymentMethod>, BaasError> {
    let methods: Vec<PaymentMethod> = Repository::new(Arc::clone(baas))
        .list_where(
            Query::table(Table::PaymentMethods)
                .eq("name", name)
                .eq("is_active", true)
                .limit(1),
        )
        .await?;
    Ok(methods.into_iter().next())
}

/// Mark the user's open abandoned-cart rows as recovered.
async fn mark_cart_recovered(
    baas: &Arc<dyn Baas>,
    user_id: UserId,
    now: DateTime<Utc>,
) -> Result<(), BaasError> {
    let query = Query::table(Table::AbandonedCarts)
        .eq("user_id", user_id)
        .eq("recovered", false);
    baas.update(&query, json!({ "recovered": true, "recovered_at": now }))
        .await?;
    Ok(())
}

/// Record (or refresh) the open abandoned-cart row for `user_id`.
///
/// Called when a signed-in customer reaches checkout with a non-empty cart.
///
/// # Errors
///
/// Returns an error if the select, update or insert fails.
pub async fn record_abandoned_cart(
    baas: &Arc<dyn Baas>,
    user_id: UserId,
    cart: &Cart,
) -> Result<(), BaasError> {
    let repo: Repository<AbandonedCart> = Repository::new(Arc::clone(baas));
    let items: Vec<OrderItem> = cart.items().iter().map(OrderItem::from).collect();
    let total_amount = cart.total();

    let open = repo
        .list_where(
            Query::table(Table::AbandonedCarts)
                .eq("user_id", user_id)
                .eq("recovered", false)
                .limit(1),
        )
        .await?;

    match open.first() {
        Some(existing) => {
            repo.update(
                existing.id,
                &json!({ "items": items, "total_amount": total_amount }),
            )
            .await?;
        }
        None => {
            repo.create(&NewAbandonedCart {
                user_id,
                items,
                total_amount,
                recovered: false,
            })
            .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use angohost_baas::{MemoryBaas, Operation};
    use angohost_core::{CartItem, CartItemKind, NoticeLevel, OrderStatus};
    use rust_decimal::Decimal;

    use super::*;

    fn line(id: &str, price: i64, quantity: u32) -> CartItem {
        CartItem {
            id: id.to_string(),
            title: format!("Plan {id}"),
            price: Decimal::from(price),
            base_price: Decimal::from(price),
            quantity,
            kind: CartItemKind::Hosting,
            domain: None,
            period: None,
        }
    }

    async fn setup() -> (Arc<MemoryBaas>, Arc<dyn Baas>) {
        let memory = Arc::new(MemoryBaas::new());
        memory
            .seed(
                Table::PaymentMethods,
                [
                    json!({"name": "Multicaixa", "kind": "multicaixa_express", "is_active": true}),
                    json!({"name": "Transferência", "kind": "bank_transfer", "is_active": true}),
                    json!({"name": "Cheque", "kind": "bank_transfer", "is_active": false}),
                ],
            )
            .await;
        let baas: Arc<dyn Baas> = memory.clone();
        (memory, baas)
    }

    fn cart_with_items() -> Cart {
        let mut cart = Cart::new();
        cart.add(line("a", 2_500, 2));
        cart.add(line("b", 19_900, 1));
        cart
    }

    #[tokio::test]
    async fn test_empty_cart_issues_no_write() {
        let (memory, baas) = setup().await;
        let mut cart = Cart::new();
        let err = submit_order(
            &baas,
            &mut cart,
            Some(UserId::generate()),
            Some("Multicaixa".into()),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(err.notice().message, "Your cart is empty");
        assert_eq!(memory.writes(), 0);
    }

    #[tokio::test]
    async fn test_anonymous_visitor_issues_no_write() {
        let (memory, baas) = setup().await;
        let mut cart = cart_with_items();
        let err = submit_order(&baas, &mut cart, None, Some("Multicaixa".into()), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NotAuthenticated));
        assert_eq!(err.notice().level, NoticeLevel::Info);
        assert_eq!(memory.writes(), 0);
        assert_eq!(cart.items().len(), 2);
    }

    #[tokio::test]
    async fn test_preconditions_checked_in_order() {
        let (_memory, baas) = setup().await;
        let mut empty = Cart::new();
        let err = submit_order(&baas, &mut empty, None, None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));

        let mut cart = cart_with_items();
        let err = submit_order(&baas, &mut cart, Some(UserId::generate()), Some("  ".into()), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::MissingPaymentMethod));
    }

    #[tokio::test]
    async fn test_unknown_or_inactive_payment_method_writes_nothing() {
        let (memory, baas) = setup().await;
        for method in ["Free of charge", "Cheque"] {
            let mut cart = cart_with_items();
            let err = submit_order(&baas, &mut cart, Some(UserId::generate()), Some(method.into()), Utc::now())
                .await
                .unwrap_err();
            assert!(matches!(err, CheckoutError::UnavailablePaymentMethod));
            assert_eq!(cart.items().len(), 2);
        }
        assert_eq!(memory.writes(), 0);
        assert!(memory.rows(Table::Orders).await.is_empty());
    }

    #[tokio::test]
    async fn test_successful_order_snapshots_cart_and_clears_it() {
        let (memory, baas) = setup().await;
        let user = UserId::generate();
        let mut cart = cart_with_items();

        let order = submit_order(&baas, &mut cart, Some(user), Some("Transferência".into()), Utc::now())
            .await
            .unwrap();

        assert!(cart.is_empty());
        assert_eq!(order.user_id, user);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, Decimal::from(24_900));
        assert_eq!(order.items.len(), 2);
        assert!(order.order_number.starts_with("ORD-"));
        assert_eq!(order.payment_method.as_deref(), Some("Transferência"));
        assert_eq!(memory.rows(Table::Orders).await.len(), 1);
    }

    #[tokio::test]
    async fn test_order_write_failure_keeps_cart() {
        let (memory, baas) = setup().await;
        memory
            .fail_on(Table::Orders, Operation::Insert, "new row violates row-level security policy")
            .await;
        let mut cart = cart_with_items();

        let err = submit_order(&baas, &mut cart, Some(UserId::generate()), Some("Multicaixa".into()), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(
            err.notice().message,
            "new row violates row-level security policy"
        );
        assert_eq!(cart.items().len(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_cart_failure_does_not_fail_order() {
        let (memory, baas) = setup().await;
        memory
            .fail_on(Table::AbandonedCarts, Operation::Update, "timeout")
            .await;
        let mut cart = cart_with_items();

        let result = submit_order(&baas, &mut cart, Some(UserId::generate()), Some("Multicaixa".into()), Utc::now()).await;
        assert!(result.is_ok());
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_cart_recorded_then_recovered() {
        let (memory, baas) = setup().await;
        let user = UserId::generate();
        let mut cart = cart_with_items();

        record_abandoned_cart(&baas, user, &cart).await.unwrap();
        cart.add(line("c", 100, 1));
        record_abandoned_cart(&baas, user, &cart).await.unwrap();

        let rows = memory.rows(Table::AbandonedCarts).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["items"].as_array().unwrap().len(), 3);

        submit_order(&baas, &mut cart, Some(user), Some("Multicaixa".into()), Utc::now())
            .await
            .unwrap();
        let rows = memory.rows(Table::AbandonedCarts).await;
        assert_eq!(rows[0]["recovered"], true);
        assert!(rows[0]["recovered_at"].is_string());
    }
}

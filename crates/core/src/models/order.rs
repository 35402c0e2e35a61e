//! Orders and their embedded item snapshots.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{CartItem, CartItemKind};
use crate::entity::Table;
use crate::impl_entity;
use crate::types::{OrderId, OrderStatus, UserId, line_total};

/// A denormalized copy of one cart line, frozen at order time.
///
/// Items never reference live catalogue rows; later price changes do not
/// affect existing orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub title: String,
    pub kind: CartItemKind,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    pub subtotal: Decimal,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            kind: item.kind,
            price: item.price,
            quantity: item.quantity,
            domain: item.domain.clone(),
            period: item.period,
            subtotal: line_total(item.price, item.quantity, None),
        }
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_number: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl_entity!(Order, Table::Orders);

/// Insert payload for an order.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub order_number: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub payment_method: Option<String>,
}

impl NewOrder {
    /// Snapshot cart lines into an order for `user_id`.
    ///
    /// The total is the sum of the line subtotals.
    #[must_use]
    pub fn from_cart(
        user_id: UserId,
        order_number: String,
        items: &[CartItem],
        payment_method: Option<String>,
    ) -> Self {
        let items: Vec<OrderItem> = items.iter().map(OrderItem::from).collect();
        let total_amount = items.iter().map(|i| i.subtotal).sum();
        Self {
            user_id,
            order_number,
            total_amount,
            status: OrderStatus::Pending,
            items,
            payment_method,
        }
    }
}

/// Generate an order number from a timestamp and a random suffix.
///
/// Shape: `ORD-<unix millis>-<5 uppercase alphanumerics>`. Nothing checks the
/// number against existing orders.
#[must_use]
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("ORD-{}-{suffix}", now.timestamp_millis())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: &str, price: i64, quantity: u32) -> CartItem {
        CartItem {
            id: id.to_string(),
            title: id.to_string(),
            price: Decimal::from(price),
            base_price: Decimal::from(price),
            quantity,
            kind: CartItemKind::Hosting,
            domain: None,
            period: None,
        }
    }

    #[test]
    fn test_order_total_is_sum_of_subtotals() {
        let items = vec![line("a", 1_000, 2), line("b", 500, 3)];
        let order = NewOrder::from_cart(UserId::generate(), "ORD-1".into(), &items, None);
        assert_eq!(order.total_amount, Decimal::from(3_500));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[1].subtotal, Decimal::from(1_500));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_order_number_shape() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let number = generate_order_number(now);
        assert!(number.starts_with("ORD-1700000000000-"));
        let suffix = number.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 5);
        assert!(suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_order_decodes_from_row() {
        let row = serde_json::json!({
            "id": "5b8a4c1e-6f3a-4d0e-9b7a-2f1c3d4e5f60",
            "user_id": "0c9d8e7f-6a5b-4c3d-2e1f-0a9b8c7d6e5f",
            "order_number": "ORD-1-ABCDE",
            "total_amount": 19900,
            "status": "processing",
            "items": [],
            "payment_method": "Transferência",
            "created_at": "2025-03-01T10:00:00Z"
        });
        let order: Order = serde_json::from_value(row).unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.total_amount, Decimal::from(19_900));
    }
}

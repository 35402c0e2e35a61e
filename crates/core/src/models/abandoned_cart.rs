//! Carts left behind at checkout.
//!
//! A row is written when a signed-in customer reaches checkout with items in
//! their cart; submitting the order marks it recovered.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::OrderItem;
use crate::entity::Table;
use crate::impl_entity;
use crate::types::{AbandonedCartId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbandonedCart {
    pub id: AbandonedCartId,
    pub user_id: UserId,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub recovered: bool,
    #[serde(default)]
    pub recovered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl_entity!(AbandonedCart, Table::AbandonedCarts);

#[derive(Debug, Clone, Serialize)]
pub struct NewAbandonedCart {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub recovered: bool,
}

//! The shopping cart.
//!
//! A cart is an ordered list of line items held for one visitor. It is never
//! persisted as a table: the storefront serializes it into the visitor's
//! session and converts it into an order snapshot at checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ServicePlan;
use crate::notice::Notice;
use crate::types::{BillingCycle, DomainName, ServiceType, line_total};

/// Largest quantity one cart line can hold.
pub const MAX_QUANTITY: u32 = 99;

/// What a cart line buys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartItemKind {
    DomainRegistration,
    DomainTransfer,
    Hosting,
    Email,
    Vps,
}

impl From<ServiceType> for CartItemKind {
    fn from(service_type: ServiceType) -> Self {
        match service_type {
            ServiceType::Hosting => Self::Hosting,
            ServiceType::Email => Self::Email,
            ServiceType::Vps => Self::Vps,
        }
    }
}

/// One line of the cart.
///
/// `base_price` is the price of a single period; `price` is what one unit
/// costs for the chosen number of periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub title: String,
    pub price: Decimal,
    pub base_price: Decimal,
    pub quantity: u32,
    pub kind: CartItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
}

impl CartItem {
    /// Register `name` for `years` years at `yearly_price`.
    #[must_use]
    pub fn domain_registration(name: &DomainName, years: u32, yearly_price: Decimal) -> Self {
        let years = years.max(1);
        Self {
            id: format!("domain-{name}"),
            title: format!("Domain registration: {name}"),
            price: line_total(yearly_price, 1, Some(years)),
            base_price: yearly_price,
            quantity: 1,
            kind: CartItemKind::DomainRegistration,
            domain: Some(name.to_string()),
            period: Some(years),
        }
    }

    /// Transfer `name` in, billed as one year at `transfer_price`.
    #[must_use]
    pub fn domain_transfer(name: &DomainName, transfer_price: Decimal) -> Self {
        Self {
            id: format!("transfer-{name}"),
            title: format!("Domain transfer: {name}"),
            price: transfer_price,
            base_price: transfer_price,
            quantity: 1,
            kind: CartItemKind::DomainTransfer,
            domain: Some(name.to_string()),
            period: Some(1),
        }
    }

    /// Subscribe to `plan` for `periods` periods of `cycle`, optionally
    /// attached to a domain.
    #[must_use]
    pub fn plan(
        plan: &ServicePlan,
        cycle: BillingCycle,
        periods: u32,
        domain: Option<&DomainName>,
    ) -> Self {
        let periods = periods.max(1);
        let unit = plan.price_for(cycle);
        let period_label = match cycle {
            BillingCycle::Monthly => "month(s)",
            BillingCycle::Yearly => "year(s)",
        };
        Self {
            id: format!("plan-{}-{cycle}", plan.id),
            title: format!("{} ({periods} {period_label})", plan.name),
            price: line_total(unit, 1, Some(periods)),
            base_price: unit,
            quantity: 1,
            kind: plan.service_type.into(),
            domain: domain.map(ToString::to_string),
            period: Some(periods),
        }
    }

    /// `price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        line_total(self.price, self.quantity, None)
    }
}

/// An ordered list of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a line, or merge it into the line with the same id.
    ///
    /// Merging adds the quantities and takes the incoming prices and period.
    /// Quantities are capped at [`MAX_QUANTITY`]. Returns the notification to
    /// show the visitor.
    pub fn add(&mut self, item: CartItem) -> Notice {
        let message = format!("{} added to cart", item.title);
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing
                .quantity
                .saturating_add(item.quantity.max(1))
                .min(MAX_QUANTITY);
            existing.price = item.price;
            existing.base_price = item.base_price;
            existing.period = item.period;
        } else {
            let mut item = item;
            item.quantity = item.quantity.clamp(1, MAX_QUANTITY);
            self.items.push(item);
        }
        Notice::success(message)
    }

    /// Remove the line with `id`. Returns whether a line was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() < before
    }

    /// Set the quantity of line `id`.
    ///
    /// Quantities below one are ignored and leave the line unchanged. Larger
    /// ones are capped at [`MAX_QUANTITY`]. Returns whether a line was updated.
    pub fn update_quantity(&mut self, id: &str, quantity: u32) -> bool {
        if quantity < 1 {
            return false;
        }
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.quantity = quantity.min(MAX_QUANTITY);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Σ price × quantity.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Σ quantity, shown on the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count: u32, i| count.saturating_add(i.quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::notice::NoticeLevel;
    use crate::types::ServicePlanId;

    fn item(id: &str, price: i64, quantity: u32) -> CartItem {
        CartItem {
            id: id.to_string(),
            title: format!("Item {id}"),
            price: Decimal::from(price),
            base_price: Decimal::from(price),
            quantity,
            kind: CartItemKind::Hosting,
            domain: None,
            period: None,
        }
    }

    fn plan() -> ServicePlan {
        ServicePlan {
            id: ServicePlanId::generate(),
            name: "Hosting Start".to_string(),
            service_type: ServiceType::Hosting,
            price_monthly: Decimal::from(2_500),
            price_yearly: Decimal::from(25_000),
            features: vec!["5 GB SSD".to_string()],
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_is_sum_of_price_times_quantity() {
        let mut cart = Cart::new();
        cart.add(item("a", 1_000, 2));
        cart.add(item("b", 19_900, 1));
        cart.add(item("c", 350, 4));
        assert_eq!(cart.total(), Decimal::from(2_000 + 19_900 + 1_400));
        assert_eq!(cart.item_count(), 7);
    }

    #[test]
    fn test_add_then_remove_restores_prior_state() {
        let mut cart = Cart::new();
        cart.add(item("a", 1_000, 1));
        let before = cart.clone();

        cart.add(item("b", 500, 3));
        assert!(cart.remove("b"));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_add_merges_same_id() {
        let mut cart = Cart::new();
        cart.add(item("a", 1_000, 1));
        let notice = cart.add(item("a", 1_200, 2));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.items()[0].price, Decimal::from(1_200));
        assert_eq!(notice.level, NoticeLevel::Success);
        assert!(notice.message.contains("Item a"));
    }

    #[test]
    fn test_update_quantity_ignores_values_below_one() {
        let mut cart = Cart::new();
        cart.add(item("a", 1_000, 2));
        assert!(!cart.update_quantity("a", 0));
        assert_eq!(cart.items()[0].quantity, 2);
        assert!(cart.update_quantity("a", 5));
        assert_eq!(cart.items()[0].quantity, 5);
        assert!(!cart.update_quantity("missing", 5));
    }

    #[test]
    fn test_quantities_are_capped() {
        let mut cart = Cart::new();
        cart.add(item("a", 1_000, 1));
        cart.add(item("b", 1_000, 1));
        assert!(cart.update_quantity("a", 3_000_000_000));
        assert!(cart.update_quantity("b", 3_000_000_000));
        assert_eq!(cart.items()[0].quantity, MAX_QUANTITY);
        assert_eq!(cart.item_count(), 2 * MAX_QUANTITY);

        cart.add(item("a", 1_000, u32::MAX));
        assert_eq!(cart.items()[0].quantity, MAX_QUANTITY);
        cart.add(item("c", 1_000, 500));
        assert_eq!(cart.items()[2].quantity, MAX_QUANTITY);
    }

    #[test]
    fn test_item_count_saturates() {
        let cart: Cart = serde_json::from_value(serde_json::json!({
            "items": [
                {"id": "a", "title": "A", "price": "1", "base_price": "1", "quantity": u32::MAX, "kind": "hosting"},
                {"id": "b", "title": "B", "price": "1", "base_price": "1", "quantity": 5, "kind": "hosting"}
            ]
        }))
        .unwrap();
        assert_eq!(cart.item_count(), u32::MAX);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(item("a", 1_000, 1));
        assert!(!cart.remove("zzz"));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_clear_empties_cart() {
        let mut cart = Cart::new();
        cart.add(item("a", 1_000, 1));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_domain_registration_multiplies_years() {
        let name = DomainName::parse("loja.ao").unwrap();
        let line = CartItem::domain_registration(&name, 3, Decimal::from(15_000));
        assert_eq!(line.price, Decimal::from(45_000));
        assert_eq!(line.base_price, Decimal::from(15_000));
        assert_eq!(line.id, "domain-loja.ao");
        assert_eq!(line.period, Some(3));
    }

    #[test]
    fn test_plan_line_uses_cycle_price() {
        let plan = plan();
        let line = CartItem::plan(&plan, BillingCycle::Monthly, 6, None);
        assert_eq!(line.price, Decimal::from(15_000));
        assert_eq!(line.kind, CartItemKind::Hosting);

        let yearly = CartItem::plan(&plan, BillingCycle::Yearly, 1, None);
        assert_eq!(yearly.price, Decimal::from(25_000));
        assert_ne!(line.id, yearly.id);
    }

    #[test]
    fn test_cart_serializes_as_item_list() {
        let mut cart = Cart::new();
        cart.add(item("a", 1_000, 1));
        let json = serde_json::to_value(&cart).unwrap();
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}

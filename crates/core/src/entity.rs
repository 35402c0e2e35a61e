//! BaaS tables and the [`Entity`] trait.
//!
//! Every persisted type names the table it lives in and knows its own key.
//! Generic code in `angohost-baas` (repositories, resource views, realtime
//! feeds) is written once against this trait instead of once per table.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Tables the application reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Orders,
    Invoices,
    Domains,
    Services,
    Tickets,
    Profiles,
    PaymentMethods,
    ServicePlans,
    DomainExtensions,
    AbandonedCarts,
}

impl Table {
    /// Every table, used by the realtime feed to join all channels.
    pub const ALL: &'static [Self] = &[
        Self::Orders,
        Self::Invoices,
        Self::Domains,
        Self::Services,
        Self::Tickets,
        Self::Profiles,
        Self::PaymentMethods,
        Self::ServicePlans,
        Self::DomainExtensions,
        Self::AbandonedCarts,
    ];

    /// Table name as known to the BaaS.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Invoices => "invoices",
            Self::Domains => "domains",
            Self::Services => "services",
            Self::Tickets => "tickets",
            Self::Profiles => "profiles",
            Self::PaymentMethods => "payment_methods",
            Self::ServicePlans => "service_plans",
            Self::DomainExtensions => "domain_extensions",
            Self::AbandonedCarts => "abandoned_carts",
        }
    }

    /// Look a table up by its BaaS name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A row type stored in one BaaS table.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table holding rows of this type.
    const TABLE: Table;

    /// Column lists are ordered by.
    const ORDER_BY: &'static str = "created_at";

    /// Whether lists are ordered descending. Defaults to newest first.
    const ORDER_DESCENDING: bool = true;

    /// Primary key of this row.
    fn key(&self) -> Uuid;
}

/// Implement [`Entity`] for a model whose `id` field is a `define_id!` type.
///
/// The `order_by` form sorts ascending on the given column; the short form
/// sorts newest first.
#[macro_export]
macro_rules! impl_entity {
    ($ty:ty, $table:expr) => {
        impl $crate::entity::Entity for $ty {
            const TABLE: $crate::entity::Table = $table;

            fn key(&self) -> ::uuid::Uuid {
                self.id.as_uuid()
            }
        }
    };
    ($ty:ty, $table:expr, order_by = $order:literal) => {
        impl $crate::entity::Entity for $ty {
            const TABLE: $crate::entity::Table = $table;
            const ORDER_BY: &'static str = $order;
            const ORDER_DESCENDING: bool = false;

            fn key(&self) -> ::uuid::Uuid {
                self.id.as_uuid()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_round_trip() {
        for table in Table::ALL {
            assert_eq!(Table::from_name(table.name()), Some(*table));
        }
        assert_eq!(Table::from_name("carts"), None);
    }
}

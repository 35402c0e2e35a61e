//! Status and classification enums stored as text columns.
//!
//! Each enum serializes to exactly the string the BaaS stores, implements
//! `Display`/`FromStr` with the same spelling, and exposes `ALL` for building
//! admin select boxes. Status transitions are free-form: any value may follow
//! any other.

use serde::{Deserialize, Serialize};

/// Error returned when a stored string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The stored spelling.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

text_enum! {
    /// Order lifecycle status.
    OrderStatus ("order status") {
        Pending => "pending",
        Processing => "processing",
        Completed => "completed",
        Canceled => "canceled",
    }
}

text_enum! {
    /// Invoice payment status.
    InvoiceStatus ("invoice status") {
        Pending => "pending",
        Paid => "paid",
        Overdue => "overdue",
        Cancelled => "cancelled",
    }
}

text_enum! {
    /// Registration status of a customer domain.
    DomainStatus ("domain status") {
        Active => "active",
        Expired => "expired",
        Pending => "pending",
        Transferring => "transferring",
    }
}

text_enum! {
    /// Status of a provisioned hosting/email service.
    ServiceStatus ("service status") {
        Active => "active",
        Pending => "pending",
        Suspended => "suspended",
        Cancelled => "cancelled",
    }
}

text_enum! {
    /// Support ticket status.
    TicketStatus ("ticket status") {
        Open => "open",
        InProgress => "in-progress",
        Closed => "closed",
    }
}

text_enum! {
    /// Support ticket priority.
    TicketPriority ("ticket priority") {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

text_enum! {
    /// Role of a profile. Staff roles grant back-office access.
    UserRole ("user role") {
        /// Full back-office access.
        Admin => "admin",
        /// Tickets, domains and services.
        Support => "support",
        /// Orders, invoices and payment methods.
        Finance => "finance",
        /// Storefront only.
        Customer => "customer",
    }
}

text_enum! {
    /// Kind of product a service plan or cart line represents.
    ServiceType ("service type") {
        Hosting => "hosting",
        Email => "email",
        Vps => "vps",
    }
}

text_enum! {
    /// How a customer pays for an order.
    PaymentKind ("payment kind") {
        BankTransfer => "bank_transfer",
        MulticaixaExpress => "multicaixa_express",
        PaymentReference => "payment_reference",
    }
}

text_enum! {
    /// Billing cycle chosen for a hosting or email plan.
    BillingCycle ("billing cycle") {
        Monthly => "monthly",
        Yearly => "yearly",
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Default for TicketStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl Default for TicketPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Customer
    }
}

impl UserRole {
    /// Whether this role may sign in to the back-office at all.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        !matches!(self, Self::Customer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_status_uses_hyphenated_spelling() {
        assert_eq!(TicketStatus::InProgress.as_str(), "in-progress");
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            "in-progress".parse::<TicketStatus>().unwrap(),
            TicketStatus::InProgress
        );
    }

    #[test]
    fn test_order_status_round_trip_all() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn test_unknown_variant_error() {
        let err = "refunded".parse::<InvoiceStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid invoice status: refunded");
    }

    #[test]
    fn test_staff_roles() {
        assert!(UserRole::Admin.is_staff());
        assert!(UserRole::Finance.is_staff());
        assert!(!UserRole::Customer.is_staff());
    }
}

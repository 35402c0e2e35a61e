//! Back-office sections and which roles may open them.

use angohost_core::{Table, UserRole};

/// A back-office area. Every route belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    Users,
    Orders,
    Invoices,
    Domains,
    Services,
    Tickets,
    PaymentMethods,
    ServicePlans,
    DomainExtensions,
    Settings,
}

impl Section {
    /// Sections in navigation order.
    pub const ALL: &'static [Self] = &[
        Self::Dashboard,
        Self::Users,
        Self::Orders,
        Self::Invoices,
        Self::Domains,
        Self::Services,
        Self::Tickets,
        Self::PaymentMethods,
        Self::ServicePlans,
        Self::DomainExtensions,
        Self::Settings,
    ];

    /// Whether `role` may open this section.
    ///
    /// Admins see everything; support handles customer assets and tickets;
    /// finance handles money. Customers never reach the back-office.
    #[must_use]
    pub const fn allows(self, role: UserRole) -> bool {
        match role {
            UserRole::Admin => true,
            UserRole::Support => matches!(
                self,
                Self::Dashboard | Self::Domains | Self::Services | Self::Tickets
            ),
            UserRole::Finance => matches!(
                self,
                Self::Dashboard | Self::Orders | Self::Invoices | Self::PaymentMethods
            ),
            UserRole::Customer => false,
        }
    }

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/",
            Self::Users => "/users",
            Self::Orders => "/orders",
            Self::Invoices => "/invoices",
            Self::Domains => "/domains",
            Self::Services => "/services",
            Self::Tickets => "/tickets",
            Self::PaymentMethods => "/payment-methods",
            Self::ServicePlans => "/plans",
            Self::DomainExtensions => "/extensions",
            Self::Settings => "/settings",
        }
    }

    /// Table whose changes should refresh this section's page.
    #[must_use]
    pub const fn table(self) -> Option<Table> {
        match self {
            Self::Dashboard | Self::Settings => None,
            Self::Users => Some(Table::Profiles),
            Self::Orders => Some(Table::Orders),
            Self::Invoices => Some(Table::Invoices),
            Self::Domains => Some(Table::Domains),
            Self::Services => Some(Table::Services),
            Self::Tickets => Some(Table::Tickets),
            Self::PaymentMethods => Some(Table::PaymentMethods),
            Self::ServicePlans => Some(Table::ServicePlans),
            Self::DomainExtensions => Some(Table::DomainExtensions),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Users => "Users",
            Self::Orders => "Orders",
            Self::Invoices => "Invoices",
            Self::Domains => "Domains",
            Self::Services => "Services",
            Self::Tickets => "Tickets",
            Self::PaymentMethods => "Payment methods",
            Self::ServicePlans => "Plans",
            Self::DomainExtensions => "Extensions",
            Self::Settings => "Settings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_sees_everything() {
        assert!(Section::ALL.iter().all(|s| s.allows(UserRole::Admin)));
    }

    #[test]
    fn test_customer_sees_nothing() {
        assert!(!Section::ALL.iter().any(|s| s.allows(UserRole::Customer)));
    }

    #[test]
    fn test_support_and_finance_split() {
        assert!(Section::Tickets.allows(UserRole::Support));
        assert!(!Section::Invoices.allows(UserRole::Support));
        assert!(Section::Invoices.allows(UserRole::Finance));
        assert!(!Section::Tickets.allows(UserRole::Finance));
        assert!(!Section::Users.allows(UserRole::Finance));
    }
}

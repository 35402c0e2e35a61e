//! Catalogue tables managed from the back-office: payment methods offered
//! at checkout, hosting/email plans, and domain extension pricing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::Table;
use crate::impl_entity;
use crate::types::{
    BillingCycle, DomainExtensionId, PaymentKind, PaymentMethodId, ServicePlanId, ServiceType,
};

/// A way of paying that checkout offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    pub kind: PaymentKind,
    #[serde(default)]
    pub instructions: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl_entity!(PaymentMethod, Table::PaymentMethods);

/// Insert payload for a payment method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPaymentMethod {
    pub name: String,
    pub kind: PaymentKind,
    pub instructions: Option<String>,
    pub is_active: bool,
}

/// A sellable hosting, email or VPS plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePlan {
    pub id: ServicePlanId,
    pub name: String,
    pub service_type: ServiceType,
    pub price_monthly: Decimal,
    pub price_yearly: Decimal,
    #[serde(default)]
    pub features: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl_entity!(ServicePlan, Table::ServicePlans, order_by = "price_monthly");

impl ServicePlan {
    /// Unit price for one period of `cycle`.
    #[must_use]
    pub const fn price_for(&self, cycle: BillingCycle) -> Decimal {
        match cycle {
            BillingCycle::Monthly => self.price_monthly,
            BillingCycle::Yearly => self.price_yearly,
        }
    }
}

/// Insert payload for a service plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewServicePlan {
    pub name: String,
    pub service_type: ServiceType,
    pub price_monthly: Decimal,
    pub price_yearly: Decimal,
    pub features: Vec<String>,
    pub is_active: bool,
}

/// Pricing for one domain extension (e.g. `.ao`, `.co.ao`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainExtension {
    pub id: DomainExtensionId,
    pub extension: String,
    pub register_price: Decimal,
    pub renew_price: Decimal,
    #[serde(default)]
    pub transfer_price: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl_entity!(DomainExtension, Table::DomainExtensions, order_by = "extension");

/// Insert payload for a domain extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDomainExtension {
    pub extension: String,
    pub register_price: Decimal,
    pub renew_price: Decimal,
    pub transfer_price: Option<Decimal>,
    pub is_active: bool,
}

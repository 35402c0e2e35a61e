//! Provisioned hosting, email and VPS services.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::Table;
use crate::impl_entity;
use crate::types::{ServiceId, ServiceStatus, ServiceType, UserId};

/// A service provisioned for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingService {
    pub id: ServiceId,
    pub user_id: UserId,
    pub name: String,
    pub service_type: ServiceType,
    pub status: ServiceStatus,
    #[serde(default)]
    pub price_monthly: Option<Decimal>,
    #[serde(default)]
    pub price_yearly: Option<Decimal>,
    #[serde(default)]
    pub renewal_date: Option<NaiveDate>,
    #[serde(default)]
    pub control_panel_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl_entity!(HostingService, Table::Services);

/// Insert payload for a service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewService {
    pub user_id: UserId,
    pub name: String,
    pub service_type: ServiceType,
    pub status: ServiceStatus,
    pub price_monthly: Option<Decimal>,
    pub price_yearly: Option<Decimal>,
    pub renewal_date: Option<NaiveDate>,
    pub control_panel_url: Option<String>,
}

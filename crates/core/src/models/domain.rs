//! Customer domains.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Table;
use crate::impl_entity;
use crate::types::{DomainId, DomainStatus, UserId};

/// A domain registered (or being transferred) for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: DomainId,
    pub user_id: UserId,
    pub domain_name: String,
    #[serde(default)]
    pub registration_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    pub status: DomainStatus,
    #[serde(default)]
    pub whois_privacy: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
}

impl_entity!(Domain, Table::Domains);

impl Domain {
    /// Days until expiry, negative once expired.
    #[must_use]
    pub fn days_to_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date.map(|d| (d - today).num_days())
    }
}

/// Boolean flags an admin can flip on a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainFlag {
    IsLocked,
    WhoisPrivacy,
    AutoRenew,
}

impl DomainFlag {
    /// Column holding this flag.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::IsLocked => "is_locked",
            Self::WhoisPrivacy => "whois_privacy",
            Self::AutoRenew => "auto_renew",
        }
    }

    /// Current value of this flag on `domain`.
    #[must_use]
    pub const fn get(self, domain: &Domain) -> bool {
        match self {
            Self::IsLocked => domain.is_locked,
            Self::WhoisPrivacy => domain.whois_privacy,
            Self::AutoRenew => domain.auto_renew,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_decodes_with_missing_flags() {
        let row = serde_json::json!({
            "id": "5b8a4c1e-6f3a-4d0e-9b7a-2f1c3d4e5f60",
            "user_id": "0c9d8e7f-6a5b-4c3d-2e1f-0a9b8c7d6e5f",
            "domain_name": "loja.ao",
            "expiry_date": "2026-01-31",
            "status": "transferring",
            "created_at": "2025-01-31T08:00:00Z"
        });
        let domain: Domain = serde_json::from_value(row).unwrap();
        assert_eq!(domain.status, DomainStatus::Transferring);
        assert!(!domain.is_locked);
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(domain.days_to_expiry(today), Some(30));
        assert!(!DomainFlag::AutoRenew.get(&domain));
    }
}

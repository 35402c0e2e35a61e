//! Session-related types for staff authentication.

use serde::{Deserialize, Serialize};

use angohost_core::models::Profile;
use angohost_core::{UserId, UserRole};

use super::section::Section;

/// Session-stored staff identity.
///
/// Copied from the profile at sign-in. A role change made by another admin
/// takes effect at the staff member's next sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentStaff {
    /// Identity id, also the key of the profile row.
    pub id: UserId,
    /// Email address used to sign in.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role at sign-in.
    pub role: UserRole,
}

impl CurrentStaff {
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            name: profile.display_name().to_string(),
            role: profile.role,
        }
    }

    /// Whether this staff member may open `section`.
    #[must_use]
    pub const fn can(&self, section: Section) -> bool {
        section.allows(self.role)
    }
}

/// Session keys for staff authentication data.
pub mod keys {
    /// Key for storing the current signed-in staff member.
    pub const CURRENT_STAFF: &str = "current_staff";
}

//! Session-related types.
//!
//! The visitor's session holds three things: who is signed in, the cart, and
//! queued notices. Everything else is read from the BaaS on demand.

use angohost_core::UserId;
use serde::{Deserialize, Serialize};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Identity id, also the key of the user's profile row.
    pub id: UserId,
    /// Email address used to sign in.
    pub email: String,
    /// Display name from the profile, if set.
    #[serde(default)]
    pub full_name: Option<String>,
}

impl CurrentUser {
    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the serialized cart.
    pub const CART: &str = "cart";

    /// Key for queued notices shown on the next page.
    pub const NOTICES: &str = "notices";
}

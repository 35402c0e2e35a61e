//! The visitor's cart, stored in the session as JSON.
//!
//! The session is the cart's only home; there is no cart table. A cart that
//! fails to deserialize (e.g. after a format change) is treated as empty.

use angohost_core::Cart;
use tower_sessions::Session;
use tracing::warn;

use crate::models::session_keys;

/// Load the cart from the session, empty if absent or unreadable.
pub async fn load(session: &Session) -> Cart {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "Discarding unreadable cart");
            Cart::new()
        }
    }
}

/// Store the cart in the session.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn save(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

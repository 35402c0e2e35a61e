//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Session-held cart
//! - `notices` - Notices queued in the session and shown once
//! - `checkout` - Order submission
//! - `domains` - Domain availability and pricing
//! - `nif` - External NIF lookup
//! - `email` - Order confirmation email

pub mod cart;
pub mod checkout;
pub mod domains;
pub mod email;
pub mod nif;
pub mod notices;

pub use checkout::{CheckoutError, submit_order};
pub use email::EmailService;
pub use nif::{NifClient, NifInfo, NifLookupError};

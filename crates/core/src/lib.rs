//! AngoHost Core - Shared domain types.
//!
//! This crate provides the types shared by every AngoHost component:
//! - `storefront` - Public storefront (marketing pages, cart, checkout, account)
//! - `admin` - Staff back-office
//! - `cli` - Operator tools
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients. Persistence lives behind the BaaS interface in `angohost-baas`.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, money, emails, domain names, NIFs and statuses
//! - [`entity`] - BaaS table names and the [`Entity`] trait
//! - [`models`] - Row types for every persisted entity
//! - [`cart`] - The shopping cart and its line items
//! - [`notice`] - User-facing notifications

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod entity;
pub mod models;
pub mod notice;
pub mod types;

pub use cart::{Cart, CartItem, CartItemKind};
pub use entity::{Entity, Table};
pub use notice::{Notice, NoticeLevel};
pub use types::*;

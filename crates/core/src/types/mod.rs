//! Core types for AngoHost.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod domain_name;
pub mod email;
pub mod id;
pub mod money;
pub mod nif;
pub mod status;

pub use domain_name::{DomainName, DomainNameError, is_valid_domain};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{format_kwanza, line_total};
pub use nif::{Nif, NifError};
pub use status::*;

//! Business logic services for admin.
//!
//! # Services
//!
//! - `domains` - Lock, privacy and auto-renew flags
//! - `users` - Role and activation changes, user deletion with cleanup
//! - `invoices` - Payment status, invoicing orders, overdue sweep
//! - `smtp` - SMTP connection test
//! - `live` - Coalesced refresh signals for open pages

pub mod domains;
pub mod invoices;
pub mod live;
pub mod smtp;
pub mod users;

pub use smtp::{SmtpTestRequest, SmtpTestResult, test_connection};
pub use users::{DeletionReport, delete_user};

//! Session-held models and access rules for the back-office.

pub mod section;
pub mod session;

pub use section::Section;
pub use session::{CurrentStaff, keys as session_keys};

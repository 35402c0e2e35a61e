//! HTTP middleware stack for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with in-memory store)
//! 4. CORS on the functions API only

pub mod auth;
pub mod session;

pub use auth::{
    LOGIN_PATH, OptionalStaff, RequireStaff, clear_current_staff, set_current_staff,
};
pub use session::create_session_layer;

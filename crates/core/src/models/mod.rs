//! Row types for every persisted entity.
//!
//! Field names match the BaaS column names (snake_case), so rows decode with
//! plain serde. `New*` types are insert payloads: they omit the columns the
//! BaaS fills in (`id`, `created_at`).

pub mod abandoned_cart;
pub mod catalog;
pub mod domain;
pub mod invoice;
pub mod order;
pub mod profile;
pub mod service;
pub mod ticket;

pub use abandoned_cart::{AbandonedCart, NewAbandonedCart};
pub use catalog::{
    DomainExtension, NewDomainExtension, NewPaymentMethod, NewServicePlan, PaymentMethod,
    ServicePlan,
};
pub use domain::{Domain, DomainFlag};
pub use invoice::{Invoice, NewInvoice};
pub use order::{NewOrder, Order, OrderItem};
pub use profile::{Profile, ProfilePatch};
pub use service::{HostingService, NewService};
pub use ticket::{NewTicket, Ticket};

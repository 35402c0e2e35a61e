//! AngoHost BaaS access layer.
//!
//! Every persisted entity lives in an externally hosted database-as-a-service.
//! This crate is the only place that talks to it:
//!
//! - [`Baas`] - generic single-table select/insert/update/delete plus
//!   realtime subscriptions
//! - [`RestClient`] - the HTTP implementation (PostgREST-style endpoints)
//! - [`MemoryBaas`] - an in-process implementation used by tests and local
//!   development
//! - [`Auth`] / [`IdentityClient`] - password sign-in, sign-up and admin
//!   user deletion, delegated to the BaaS identity endpoints
//! - [`realtime`] - table change events and the websocket listener
//! - [`coalesce`] - collapses bursts of change events into refresh signals
//! - [`Repository`] / [`ResourceView`] - typed access built on [`Entity`]
//!
//! [`Entity`]: angohost_core::Entity

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod client;
pub mod coalesce;
pub mod config;
pub mod error;
pub mod memory;
pub mod query;
pub mod realtime;
pub mod repository;
pub mod rest;
pub mod view;

pub use auth::{Auth, AuthUser, IdentityClient, MemoryAuth};
pub use client::Baas;
pub use coalesce::coalesce;
pub use config::BaasConfig;
pub use error::BaasError;
pub use memory::{MemoryBaas, Operation};
pub use query::{Filter, Query};
pub use realtime::{ChangeEvent, ChangeKind, EventFilter, RealtimeHub, Subscription};
pub use repository::Repository;
pub use rest::RestClient;
pub use view::{LoadState, ResourceView};

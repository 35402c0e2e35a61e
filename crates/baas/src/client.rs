//! The generic BaaS query interface.

use angohost_core::Table;
use async_trait::async_trait;
use serde_json::Value;

use crate::error::BaasError;
use crate::query::Query;
use crate::realtime::{EventFilter, Subscription};

/// Single-table data access plus realtime change subscriptions.
///
/// Rows travel as JSON objects; typed access is layered on top by
/// [`Repository`](crate::Repository). There are no cross-table
/// transactions: each call stands alone and the backend is the only arbiter
/// of consistency.
#[async_trait]
pub trait Baas: Send + Sync {
    /// Rows matching `query`.
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BaasError>;

    /// Insert one row and return it as stored (with generated columns).
    async fn insert(&self, table: Table, row: Value) -> Result<Value, BaasError>;

    /// Apply `patch` to every row matching `query`; returns the updated rows.
    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, BaasError>;

    /// Delete every row matching `query`; returns the deleted rows.
    async fn delete(&self, query: &Query) -> Result<Vec<Value>, BaasError>;

    /// Subscribe to changes on `table`.
    fn subscribe(&self, table: Table, filter: EventFilter) -> Subscription;

    /// Subscribe to every change on several tables.
    fn subscribe_many(&self, tables: &[Table]) -> Subscription;
}

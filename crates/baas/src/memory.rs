//! In-process BaaS.
//!
//! [`MemoryBaas`] keeps every table as a list of JSON rows and evaluates
//! queries the same way the REST backend's server would. It fills `id` and
//! `created_at` on insert, publishes a change event for each written row,
//! counts writes, and can be told to fail specific operations so callers'
//! error paths can be exercised.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use angohost_core::Table;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::client::Baas;
use crate::error::BaasError;
use crate::query::Query;
use crate::realtime::{ChangeEvent, ChangeKind, EventFilter, RealtimeHub, Subscription};

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

/// In-memory implementation of [`Baas`].
#[derive(Debug, Default)]
pub struct MemoryBaas {
    tables: RwLock<HashMap<Table, Vec<Value>>>,
    failures: RwLock<HashMap<(Table, Operation), String>>,
    writes: AtomicUsize,
    hub: RealtimeHub,
}

impl MemoryBaas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store rows as-is, without publishing events or counting writes.
    pub async fn seed(&self, table: Table, rows: impl IntoIterator<Item = Value>) {
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table).or_default();
        for row in rows {
            stored.push(with_defaults(row));
        }
    }

    /// Every row currently stored in `table`, in insertion order.
    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.tables
            .read()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    /// Make `operation` on `table` fail with `message` until cleared.
    pub async fn fail_on(&self, table: Table, operation: Operation, message: &str) {
        self.failures
            .write()
            .await
            .insert((table, operation), message.to_string());
    }

    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Number of insert/update/delete calls that reached the store.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// The hub change events are published on.
    #[must_use]
    pub const fn hub(&self) -> &RealtimeHub {
        &self.hub
    }

    async fn check(&self, table: Table, operation: Operation) -> Result<(), BaasError> {
        match self.failures.read().await.get(&(table, operation)) {
            Some(message) => Err(BaasError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }

    fn publish(&self, table: Table, kind: ChangeKind, rows: &[Value]) {
        for row in rows {
            self.hub
                .publish(ChangeEvent::new(table, kind, Some(row.clone())));
        }
    }
}

fn with_defaults(mut row: Value) -> Value {
    if let Some(object) = row.as_object_mut() {
        object
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        object
            .entry("created_at")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
    }
    row
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl Baas for MemoryBaas {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BaasError> {
        self.check(query.table, Operation::Select).await?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();
        query.apply_order_and_limit(&mut rows);
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, BaasError> {
        self.check(table, Operation::Insert).await?;
        if !row.is_object() {
            return Err(BaasError::Api {
                status: 400,
                message: "row must be a JSON object".to_string(),
            });
        }
        let row = with_defaults(row);
        self.tables
            .write()
            .await
            .entry(table)
            .or_default()
            .push(row.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.publish(table, ChangeKind::Insert, std::slice::from_ref(&row));
        Ok(row)
    }

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, BaasError> {
        self.check(query.table, Operation::Update).await?;
        let updated: Vec<Value> = {
            let mut tables = self.tables.write().await;
            tables
                .entry(query.table)
                .or_default()
                .iter_mut()
                .filter(|r| query.matches(r))
                .map(|row| {
                    merge(row, &patch);
                    row.clone()
                })
                .collect()
        };
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.publish(query.table, ChangeKind::Update, &updated);
        Ok(updated)
    }

    async fn delete(&self, query: &Query) -> Result<Vec<Value>, BaasError> {
        self.check(query.table, Operation::Delete).await?;
        let deleted: Vec<Value> = {
            let mut tables = self.tables.write().await;
            let rows = tables.entry(query.table).or_default();
            let (gone, kept): (Vec<Value>, Vec<Value>) =
                rows.drain(..).partition(|r| query.matches(r));
            *rows = kept;
            gone
        };
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.publish(query.table, ChangeKind::Delete, &deleted);
        Ok(deleted)
    }

    fn subscribe(&self, table: Table, filter: EventFilter) -> Subscription {
        self.hub.subscribe(table, filter)
    }

    fn subscribe_many(&self, tables: &[Table]) -> Subscription {
        self.hub.subscribe_many(tables)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_insert_fills_defaults_and_counts_write() {
        let baas = MemoryBaas::new();
        let row = baas
            .insert(Table::Tickets, json!({"subject": "DNS"}))
            .await
            .unwrap();
        assert!(row["id"].is_string());
        assert!(row["created_at"].is_string());
        assert_eq!(baas.writes(), 1);
        assert_eq!(baas.rows(Table::Tickets).await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_matching_rows_only() {
        let baas = MemoryBaas::new();
        baas.seed(
            Table::Domains,
            [
                json!({"id": "a", "is_locked": false}),
                json!({"id": "b", "is_locked": false}),
            ],
        )
        .await;

        let updated = baas
            .update(&Query::table(Table::Domains).eq("id", "a"), json!({"is_locked": true}))
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);

        let rows = baas
            .select(&Query::table(Table::Domains).eq("is_locked", true))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "a");
    }

    #[tokio::test]
    async fn test_delete_returns_removed_rows() {
        let baas = MemoryBaas::new();
        baas.seed(
            Table::Orders,
            [json!({"user_id": "u1"}), json!({"user_id": "u2"}), json!({"user_id": "u1"})],
        )
        .await;
        let deleted = baas
            .delete(&Query::table(Table::Orders).eq("user_id", "u1"))
            .await
            .unwrap();
        assert_eq!(deleted.len(), 2);
        assert_eq!(baas.rows(Table::Orders).await.len(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let baas = MemoryBaas::new();
        baas.fail_on(Table::Orders, Operation::Insert, "insert refused")
            .await;
        let err = baas.insert(Table::Orders, json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "insert refused");
        assert_eq!(baas.writes(), 0);

        baas.clear_failures().await;
        assert!(baas.insert(Table::Orders, json!({})).await.is_ok());
    }

    #[tokio::test]
    async fn test_writes_publish_change_events() {
        let baas = MemoryBaas::new();
        let mut sub = baas.subscribe(Table::Invoices, EventFilter::All);
        baas.insert(Table::Invoices, json!({"amount": "10"}))
            .await
            .unwrap();
        let event = sub.recv().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(event.record.unwrap()["amount"], "10");
    }
}

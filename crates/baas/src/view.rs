//! Resource views: a fetched list plus mutations that refetch.
//!
//! Every back-office screen has the same shape. It loads the full list on
//! open, exposes one mutation per operation, and reloads the full list after
//! each successful mutation. Failures never propagate: they become an error
//! [`Notice`] and the operation is abandoned.

use std::future::Future;

use angohost_core::{Entity, Notice};
use tracing::warn;

use crate::error::BaasError;
use crate::query::Query;
use crate::repository::Repository;

/// Lifecycle of a view's list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// A list of `E` rows held by one screen.
#[derive(Debug)]
pub struct ResourceView<E: Entity> {
    repo: Repository<E>,
    query: Query,
    rows: Vec<E>,
    state: LoadState,
    notice: Option<Notice>,
}

impl<E: Entity> ResourceView<E> {
    /// A view over every row of the table, in default order.
    #[must_use]
    pub fn new(repo: Repository<E>) -> Self {
        Self::with_query(repo, Repository::<E>::query())
    }

    /// A view over the rows matching `query`.
    #[must_use]
    pub fn with_query(repo: Repository<E>, query: Query) -> Self {
        Self {
            repo,
            query,
            rows: Vec::new(),
            state: LoadState::Loading,
            notice: None,
        }
    }

    /// Fetch the list. On failure the previous rows are kept and an error
    /// notice is set.
    pub async fn load(&mut self) {
        match self.repo.list_where(self.query.clone()).await {
            Ok(rows) => {
                self.rows = rows;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                warn!(table = %E::TABLE, error = %e, "Failed to load resource list");
                self.state = LoadState::Failed(e.to_string());
                self.notice = Some(Notice::error(format!("Could not load {}: {e}", E::TABLE)));
            }
        }
    }

    /// Run a mutation, then refetch.
    ///
    /// On success the list is reloaded and a success notice with `message`
    /// is set. On failure an error notice carries the backend's message and
    /// the list is left as it was.
    pub async fn mutate<T, F, Fut>(&mut self, message: &str, op: F) -> Option<T>
    where
        F: FnOnce(Repository<E>) -> Fut,
        Fut: Future<Output = Result<T, BaasError>>,
    {
        match op(self.repo.clone()).await {
            Ok(value) => {
                self.load().await;
                if !matches!(self.state, LoadState::Failed(_)) {
                    self.notice = Some(Notice::success(message));
                }
                Some(value)
            }
            Err(e) => {
                warn!(table = %E::TABLE, error = %e, "Mutation failed");
                self.notice = Some(Notice::error(e.to_string()));
                None
            }
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[E] {
        &self.rows
    }

    #[must_use]
    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Take the pending notice, leaving none.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// The underlying repository.
    #[must_use]
    pub const fn repository(&self) -> &Repository<E> {
        &self.repo
    }

    /// Consume the view, returning its rows and pending notice.
    #[must_use]
    pub fn into_parts(self) -> (Vec<E>, Option<Notice>) {
        (self.rows, self.notice)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use angohost_core::models::PaymentMethod;
    use angohost_core::{NoticeLevel, Table};
    use serde_json::json;

    use super::*;
    use crate::client::Baas;
    use crate::memory::{MemoryBaas, Operation};

    async fn seeded() -> (Arc<MemoryBaas>, ResourceView<PaymentMethod>) {
        let baas = Arc::new(MemoryBaas::new());
        baas.seed(
            Table::PaymentMethods,
            [json!({
                "name": "Transferência bancária",
                "kind": "bank_transfer",
                "instructions": "IBAN AO06 0000 0000 0000 0000 0000 0",
                "is_active": true
            })],
        )
        .await;
        let view = ResourceView::new(Repository::new(baas.clone() as Arc<dyn Baas>));
        (baas, view)
    }

    #[tokio::test]
    async fn test_load_populates_rows() {
        let (_baas, mut view) = seeded().await;
        assert_eq!(view.state(), &LoadState::Loading);
        view.load().await;
        assert_eq!(view.state(), &LoadState::Ready);
        assert_eq!(view.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_mutation_refetches_list() {
        let (_baas, mut view) = seeded().await;
        view.load().await;
        let id = view.rows()[0].id;

        let result = view
            .mutate("Payment method disabled", |repo| async move {
                repo.update(id, &json!({"is_active": false})).await
            })
            .await;
        assert!(result.is_some());
        assert!(!view.rows()[0].is_active);
        assert_eq!(view.notice().unwrap().level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn test_mutation_failure_becomes_notice() {
        let (baas, mut view) = seeded().await;
        view.load().await;
        baas.fail_on(Table::PaymentMethods, Operation::Delete, "permission denied")
            .await;
        let id = view.rows()[0].id;

        let result = view
            .mutate("Deleted", |repo| async move { repo.delete(id).await })
            .await;
        assert!(result.is_none());
        assert_eq!(view.rows().len(), 1);
        let notice = view.take_notice().unwrap();
        assert!(notice.is_error());
        assert_eq!(notice.message, "permission denied");
        assert!(view.notice().is_none());
    }

    #[tokio::test]
    async fn test_load_failure_sets_failed_state() {
        let (baas, mut view) = seeded().await;
        baas.fail_on(Table::PaymentMethods, Operation::Select, "offline")
            .await;
        view.load().await;
        assert_eq!(view.state(), &LoadState::Failed("offline".to_string()));
        assert!(view.notice().unwrap().is_error());
    }
}

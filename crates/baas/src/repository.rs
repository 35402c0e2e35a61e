//! Typed access to one table.
//!
//! [`Repository<E>`] wraps a shared [`Baas`] handle and converts rows to and
//! from an [`Entity`] type. One generic implementation serves every table.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use angohost_core::{Entity, UserId};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::client::Baas;
use crate::error::BaasError;
use crate::query::Query;

/// Typed CRUD over the table of `E`.
pub struct Repository<E> {
    baas: Arc<dyn Baas>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            baas: Arc::clone(&self.baas),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("table", &E::TABLE)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> Repository<E> {
    #[must_use]
    pub fn new(baas: Arc<dyn Baas>) -> Self {
        Self {
            baas,
            _entity: PhantomData,
        }
    }

    /// Base query for this table with the entity's default ordering.
    #[must_use]
    pub fn query() -> Query {
        Query::table(E::TABLE).order(E::ORDER_BY, E::ORDER_DESCENDING)
    }

    /// Every row, in the entity's default order.
    ///
    /// # Errors
    ///
    /// Returns an error if the select fails or a row does not decode.
    pub async fn list(&self) -> Result<Vec<E>, BaasError> {
        self.list_where(Self::query()).await
    }

    /// Rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the select fails or a row does not decode.
    pub async fn list_where(&self, query: Query) -> Result<Vec<E>, BaasError> {
        decode_rows(self.baas.select(&query).await?)
    }

    /// Rows owned by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the select fails or a row does not decode.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<E>, BaasError> {
        self.list_where(Self::query().eq("user_id", user_id)).await
    }

    /// The row with primary key `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the select fails or the row does not decode.
    pub async fn find(&self, id: impl Into<Uuid>) -> Result<Option<E>, BaasError> {
        let query = Query::table(E::TABLE).eq("id", id.into()).limit(1);
        Ok(decode_rows(self.baas.select(&query).await?)?.into_iter().next())
    }

    /// Like [`find`](Self::find) but missing rows are an error.
    ///
    /// # Errors
    ///
    /// Returns [`BaasError::NotFound`] if no row has this key.
    pub async fn get(&self, id: impl Into<Uuid>) -> Result<E, BaasError> {
        let id = id.into();
        self.find(id)
            .await?
            .ok_or_else(|| BaasError::NotFound(format!("{}/{id}", E::TABLE)))
    }

    /// Insert a row built from `new` and return the stored entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails or the stored row does not decode.
    pub async fn create<N: Serialize + Sync>(&self, new: &N) -> Result<E, BaasError> {
        let row = serde_json::to_value(new)?;
        let stored = self.baas.insert(E::TABLE, row).await?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Apply `patch` to the row with key `id` and return it.
    ///
    /// # Errors
    ///
    /// Returns [`BaasError::NotFound`] if no row was updated.
    pub async fn update<P: Serialize + Sync>(
        &self,
        id: impl Into<Uuid>,
        patch: &P,
    ) -> Result<E, BaasError> {
        let id = id.into();
        let query = Query::table(E::TABLE).eq("id", id);
        let rows = self
            .baas
            .update(&query, serde_json::to_value(patch)?)
            .await?;
        decode_rows::<E>(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| BaasError::NotFound(format!("{}/{id}", E::TABLE)))
    }

    /// Apply `patch` to every row matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails or a row does not decode.
    pub async fn update_where<P: Serialize + Sync>(
        &self,
        query: Query,
        patch: &P,
    ) -> Result<Vec<E>, BaasError> {
        decode_rows(
            self.baas
                .update(&query, serde_json::to_value(patch)?)
                .await?,
        )
    }

    /// Delete the row with key `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete(&self, id: impl Into<Uuid>) -> Result<(), BaasError> {
        let query = Query::table(E::TABLE).eq("id", id.into());
        self.baas.delete(&query).await?;
        Ok(())
    }

    /// Delete every row whose `column` equals `value`; returns how many.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_where(&self, column: &str, value: impl ToString) -> Result<usize, BaasError> {
        let query = Query::table(E::TABLE).eq(column, value);
        Ok(self.baas.delete(&query).await?.len())
    }
}

fn decode_rows<E: Entity>(rows: Vec<Value>) -> Result<Vec<E>, BaasError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(BaasError::from))
        .collect()
}

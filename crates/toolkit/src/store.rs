use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::ToolError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),
    #[error("a row with id {id} already exists for kind '{kind}'")]
    Conflict { kind: String, id: i64 },
    #[error("no row with id {id} exists for kind '{kind}'")]
    Missing { kind: String, id: i64 },
}

/// One row-level change inside an atomic batch.
#[derive(Debug, Clone)]
pub enum Mutation {
    Insert {
        kind: &'static str,
        id: i64,
        row: Value,
    },
    Replace {
        kind: &'static str,
        id: i64,
        row: Value,
    },
    Remove {
        kind: &'static str,
        id: i64,
    },
}

/// Persistence seam. Lookups are by primary key only at this layer; list
/// scoping goes through `fetch_matching` on a foreign-key field. `apply`
/// executes a batch atomically so related rows never diverge.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn next_id(&self, kind: &'static str) -> Result<i64, StoreError>;
    async fn fetch(&self, kind: &'static str, id: i64) -> Result<Option<Value>, StoreError>;
    async fn fetch_matching(
        &self,
        kind: &'static str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError>;
    async fn insert(&self, kind: &'static str, id: i64, row: Value) -> Result<(), StoreError>;
    async fn replace(&self, kind: &'static str, id: i64, row: Value) -> Result<(), StoreError>;
    async fn remove(&self, kind: &'static str, id: i64) -> Result<bool, StoreError>;
    async fn apply(&self, batch: Vec<Mutation>) -> Result<(), StoreError>;
}

/// A storable domain entity. `KIND` doubles as the storage kind and the
/// `<KIND>_NOT_FOUND` error-code prefix.
pub trait DomainEntity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: &'static str;
    /// Human label used in messages ("Brand", "CI color").
    const LABEL: &'static str;

    fn id(&self) -> i64;

    fn team_id(&self) -> Option<i64> {
        None
    }

    fn touch(&mut self, now: DateTime<Utc>);
}

/// Serialize an entity into its stored row shape.
pub fn to_row<E: Serialize>(entity: &E) -> Result<Value, ToolError> {
    serde_json::to_value(entity)
        .map_err(|err| ToolError::Execution(format!("Failed to serialize row: {err}")))
}

/// Serialize an entity into a payload map for projections.
pub fn row_map<E: Serialize>(entity: &E) -> Result<Map<String, Value>, ToolError> {
    match to_row(entity)? {
        Value::Object(map) => Ok(map),
        other => Err(ToolError::Execution(format!(
            "Entity did not serialize to an object: {other}"
        ))),
    }
}

/// Deserialize a stored row into its entity type.
pub fn from_row<E: DomainEntity>(row: Value) -> Result<E, ToolError> {
    serde_json::from_value(row).map_err(|err| {
        ToolError::Execution(format!("Stored {} row is malformed: {err}", E::KIND))
    })
}

/// Typed view over the store: maps resolver misses to per-entity not-found
/// codes and malformed rows to execution errors.
#[derive(Clone, Copy)]
pub struct Repo<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> Repo<'a> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Repo { store }
    }

    pub async fn find<E: DomainEntity>(&self, id: i64) -> Result<Option<E>, ToolError> {
        match self.store.fetch(E::KIND, id).await? {
            Some(row) => Ok(Some(from_row(row)?)),
            None => Ok(None),
        }
    }

    pub async fn require<E: DomainEntity>(&self, id: i64) -> Result<E, ToolError> {
        self.find(id)
            .await?
            .ok_or_else(|| ToolError::not_found(E::KIND, E::LABEL, id))
    }

    pub async fn matching<E: DomainEntity>(
        &self,
        field: &str,
        value: &Value,
    ) -> Result<Vec<E>, ToolError> {
        let rows = self.store.fetch_matching(E::KIND, field, value).await?;
        rows.into_iter().map(from_row).collect()
    }

    pub async fn matching_rows(
        &self,
        kind: &'static str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, ToolError> {
        Ok(self.store.fetch_matching(kind, field, value).await?)
    }

    pub async fn next_id<E: DomainEntity>(&self) -> Result<i64, ToolError> {
        Ok(self.store.next_id(E::KIND).await?)
    }

    pub async fn insert<E: DomainEntity>(&self, entity: &E) -> Result<(), ToolError> {
        let row = to_row(entity)?;
        Ok(self.store.insert(E::KIND, entity.id(), row).await?)
    }

    pub async fn replace<E: DomainEntity>(&self, entity: &E) -> Result<(), ToolError> {
        let row = to_row(entity)?;
        Ok(self.store.replace(E::KIND, entity.id(), row).await?)
    }

    pub async fn remove<E: DomainEntity>(&self, id: i64) -> Result<bool, ToolError> {
        Ok(self.store.remove(E::KIND, id).await?)
    }

    pub async fn apply(&self, batch: Vec<Mutation>) -> Result<(), ToolError> {
        Ok(self.store.apply(batch).await?)
    }
}

//! In-memory entity store.
//!
//! Backs tests and single-process deployments. Rows are stored as JSON
//! objects keyed by (kind, id); id sequences mirror the autoincrement
//! columns of a relational backend. `apply` validates the whole batch under
//! the write lock before touching anything, so a failing batch leaves the
//! store untouched.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use toolkit::{EntityStore, Mutation, StoreError};

#[derive(Default)]
struct Inner {
    rows: HashMap<&'static str, BTreeMap<i64, Value>>,
    sequences: HashMap<&'static str, i64>,
}

impl Inner {
    fn check(&self, mutation: &Mutation) -> Result<(), StoreError> {
        match mutation {
            Mutation::Insert { kind, id, .. } => {
                if self.rows.get(kind).is_some_and(|table| table.contains_key(id)) {
                    return Err(StoreError::Conflict {
                        kind: kind.to_string(),
                        id: *id,
                    });
                }
            }
            Mutation::Replace { kind, id, .. } | Mutation::Remove { kind, id } => {
                if !self.rows.get(kind).is_some_and(|table| table.contains_key(id)) {
                    return Err(StoreError::Missing {
                        kind: kind.to_string(),
                        id: *id,
                    });
                }
            }
        }
        Ok(())
    }

    fn execute(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::Insert { kind, id, row } | Mutation::Replace { kind, id, row } => {
                self.rows.entry(kind).or_default().insert(id, row);
            }
            Mutation::Remove { kind, id } => {
                if let Some(table) = self.rows.get_mut(kind) {
                    table.remove(&id);
                }
            }
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn next_id(&self, kind: &'static str) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        let seq = inner.sequences.entry(kind).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }

    async fn fetch(&self, kind: &'static str, id: i64) -> Result<Option<Value>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.get(kind).and_then(|table| table.get(&id)).cloned())
    }

    async fn fetch_matching(
        &self,
        kind: &'static str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        let inner = self.inner.read().await;
        let Some(table) = inner.rows.get(kind) else {
            return Ok(Vec::new());
        };
        Ok(table
            .values()
            .filter(|row| row.get(field) == Some(value))
            .cloned()
            .collect())
    }

    async fn insert(&self, kind: &'static str, id: i64, row: Value) -> Result<(), StoreError> {
        self.apply(vec![Mutation::Insert { kind, id, row }]).await
    }

    async fn replace(&self, kind: &'static str, id: i64, row: Value) -> Result<(), StoreError> {
        self.apply(vec![Mutation::Replace { kind, id, row }]).await
    }

    async fn remove(&self, kind: &'static str, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .rows
            .get_mut(kind)
            .is_some_and(|table| table.remove(&id).is_some()))
    }

    async fn apply(&self, batch: Vec<Mutation>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for mutation in &batch {
            inner.check(mutation)?;
        }
        for mutation in batch {
            inner.execute(mutation);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_sequences_are_per_kind() {
        let store = MemoryStore::new();
        assert_eq!(store.next_id("brand").await.unwrap(), 1);
        assert_eq!(store.next_id("brand").await.unwrap(), 2);
        assert_eq!(store.next_id("ci_color").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fetch_matching_filters_on_field_equality() {
        let store = MemoryStore::new();
        store
            .insert("ci_color", 1, json!({"id": 1, "ci_board_id": 5}))
            .await
            .unwrap();
        store
            .insert("ci_color", 2, json!({"id": 2, "ci_board_id": 6}))
            .await
            .unwrap();
        let rows = store
            .fetch_matching("ci_color", "ci_board_id", &json!(5))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], 1);
    }

    #[tokio::test]
    async fn test_failing_batch_leaves_store_untouched() {
        let store = MemoryStore::new();
        store.insert("block", 1, json!({"id": 1})).await.unwrap();
        // Second mutation targets a missing row; the first must not apply.
        let err = store
            .apply(vec![
                Mutation::Replace {
                    kind: "block",
                    id: 1,
                    row: json!({"id": 1, "content_id": 9}),
                },
                Mutation::Remove {
                    kind: "block_text",
                    id: 9,
                },
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Missing { .. }));
        let row = store.fetch("block", 1).await.unwrap().unwrap();
        assert!(row.get("content_id").is_none());
    }

    #[tokio::test]
    async fn test_insert_conflicts_on_existing_id() {
        let store = MemoryStore::new();
        store.insert("brand", 1, json!({"id": 1})).await.unwrap();
        let err = store.insert("brand", 1, json!({"id": 1})).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }
}

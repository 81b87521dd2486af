//! In-process record store with optional JSON seeding and snapshots.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use crate::store::{Document, Fields, Query, RecordStore, StoreError};

type Collection = HashMap<String, Fields>;

/// A thread-safe document store keyed by collection name.
///
/// Each collection lives behind one shard lock, so single-document writes
/// and counter increments are atomic with respect to each other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<String, Collection>>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a `{collection: {id: fields}}` JSON file if it exists.
    ///
    /// The same path is used by [`MemoryStore::snapshot`].
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let store = Self {
            collections: Arc::new(DashMap::new()),
            snapshot_path: Some(path.to_path_buf()),
        };

        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let data: HashMap<String, Collection> = serde_json::from_reader(reader)?;
            for (name, documents) in data {
                store.collections.insert(name, documents);
            }
            tracing::info!(
                path = %path.display(),
                collections = store.collections.len(),
                documents = store.len(),
                "Loaded record store seed"
            );
        }

        Ok(store)
    }

    /// Write every collection back to the seed path, if one is set.
    pub fn snapshot(&self) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let data: HashMap<String, Collection> = self
            .collections
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &data)?;
        tracing::info!(path = %path.display(), documents = self.len(), "Record store snapshot written");
        Ok(())
    }

    /// Total number of documents across collections.
    pub fn len(&self) -> usize {
        self.collections.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn not_found(collection: &str, id: &str) -> StoreError {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.collections.get(collection).and_then(|documents| {
            documents.get(id).map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            })
        }))
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields.clone());
        Ok(Document { id, fields })
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut documents = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection, id))?;
        let existing = documents
            .get_mut(id)
            .ok_or_else(|| Self::not_found(collection, id))?;
        existing.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .collections
            .get_mut(collection)
            .map(|mut documents| documents.remove(id).is_some())
            .unwrap_or(false))
    }

    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<i64, StoreError> {
        let mut documents = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection, id))?;
        let existing = documents
            .get_mut(id)
            .ok_or_else(|| Self::not_found(collection, id))?;

        let current = match existing.get(field) {
            None | Some(Value::Null) => 0,
            Some(value) => value.as_i64().ok_or_else(|| StoreError::NotNumeric {
                field: field.to_string(),
            })?,
        };
        let next = current + delta;
        existing.insert(field.to_string(), Value::from(next));
        Ok(next)
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let matched = match self.collections.get(collection) {
            Some(documents) => documents
                .iter()
                .filter(|(_, fields)| query.matches(fields))
                .map(|(id, fields)| Document {
                    id: id.clone(),
                    fields: fields.clone(),
                })
                .collect(),
            None => Vec::new(),
        };
        Ok(query.finish(matched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Direction;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_add_get_update_delete() {
        let store = MemoryStore::new();
        let created = store.add("items", fields(json!({"title": "Lamp"}))).await.unwrap();
        assert!(!created.id.is_empty());

        store
            .update("items", &created.id, fields(json!({"isAvailable": false})))
            .await
            .unwrap();
        let fetched = store.get("items", &created.id).await.unwrap().unwrap();
        assert_eq!(fetched.fields["title"], "Lamp");
        assert_eq!(fetched.fields["isAvailable"], false);

        assert!(store.delete("items", &created.id).await.unwrap());
        assert!(!store.delete("items", &created.id).await.unwrap());
        assert!(store.get("items", &created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = MemoryStore::new();
        let err = store.update("items", "nope", Fields::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_increment() {
        let store = MemoryStore::new();
        store.set("items", "a", fields(json!({"claimCount": 2}))).await.unwrap();
        assert_eq!(store.increment("items", "a", "claimCount", 1).await.unwrap(), 3);
        assert_eq!(store.increment("items", "a", "views", 5).await.unwrap(), 5);

        store.set("items", "b", fields(json!({"claimCount": "x"}))).await.unwrap();
        let err = store.increment("items", "b", "claimCount", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotNumeric { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_atomic() {
        let store = MemoryStore::new();
        store.set("items", "a", Fields::new()).await.unwrap();

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment("items", "a", "claimCount", 1).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let doc = store.get("items", "a").await.unwrap().unwrap();
        assert_eq!(doc.fields["claimCount"], 50);
    }

    #[tokio::test]
    async fn test_query() {
        let store = MemoryStore::new();
        store.set("items", "1", fields(json!({"userId": "u1", "createdAt": "2024-01-01"}))).await.unwrap();
        store.set("items", "2", fields(json!({"userId": "u2", "createdAt": "2024-02-01"}))).await.unwrap();
        store.set("items", "3", fields(json!({"userId": "u1", "createdAt": "2024-03-01"}))).await.unwrap();

        let query = Query::new()
            .where_eq("userId", "u1")
            .order_by("createdAt", Direction::Descending);
        let ids: Vec<_> = store
            .query("items", &query)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, ["3", "1"]);

        assert!(store.query("missing", &Query::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seed_and_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"users": {"u1": {"displayName": "Ann"}}}"#).unwrap();

        let store = MemoryStore::load_from_file(&path).unwrap();
        assert_eq!(store.len(), 1);
        store.set("items", "i1", fields(json!({"title": "Desk"}))).await.unwrap();
        store.snapshot().unwrap();

        let reloaded = MemoryStore::load_from_file(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        let item = reloaded.get("items", "i1").await.unwrap().unwrap();
        assert_eq!(item.fields["title"], "Desk");
    }
}

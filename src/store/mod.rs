//! Record store subsystem.
//!
//! # Data Flow
//! ```text
//! handler
//!     → RecordStore (get / add / set / update / delete / increment / query)
//!     → memory.rs (concurrent in-process collections)
//!     → Document { id, fields }
//! ```
//!
//! # Design Decisions
//! - Documents are schemaless JSON objects; handlers decode them into typed
//!   models
//! - Collection-scoped operations only, no cross-collection transactions
//! - Timestamps are RFC 3339 UTC strings with fixed precision so that
//!   lexical order is chronological

pub mod memory;

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

pub use memory::MemoryStore;

pub const ITEMS: &str = "items";
pub const USERS: &str = "users";

/// Fields of a stored document.
pub type Fields = Map<String, Value>;

/// Errors returned by a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("field {field} is not an integer")]
    NotNumeric { field: String },

    #[error("document decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored document and its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// The fields with `id` merged in.
    pub fn into_json(self) -> Value {
        let mut fields = self.fields;
        fields.insert("id".to_string(), Value::String(self.id));
        Value::Object(fields)
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(self.into_json())?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Equality filters with optional ordering and limit.
#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<(String, Value)>,
    order_by: Option<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| fields.get(field) == Some(expected))
    }

    /// Sort and truncate documents that already passed the filters.
    pub fn finish(&self, mut documents: Vec<Document>) -> Vec<Document> {
        if let Some((field, direction)) = &self.order_by {
            documents.sort_by(|a, b| {
                let ordering = compare_values(a.fields.get(field), b.fields.get(field));
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            documents.truncate(limit);
        }
        documents
    }
}

/// Orders missing < null < bool < number < string; other types compare equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Current time in the store's timestamp format.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Collection-scoped document storage.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Insert under a store-generated id.
    async fn add(&self, collection: &str, fields: Fields) -> Result<Document, StoreError>;

    /// Insert or replace under a caller-chosen id.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Merge `fields` into an existing document.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Returns whether a document was removed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Atomically add `delta` to an integer field (missing counts as 0).
    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<i64, StoreError>;

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;
}

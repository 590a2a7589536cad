//! Document store capability
//!
//! The crate does not own persistence. Any backend that can list a
//! collection, fetch a document, add a document under a new id and replace
//! an existing document implements [`DocumentStore`].

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw document as stored: field name to JSON value
pub type Record = Map<String, Value>;

/// Documents of one collection keyed by document id, in insertion order
pub type Documents = IndexMap<String, Record>;

/// Equality filter applied when listing a collection
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        record.get(&self.field) == Some(&self.value)
    }
}

/// Acknowledgment returned by a successful update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAck {
    pub success: String,
}

impl UpdateAck {
    pub fn new(id: &str, collection: &str) -> Self {
        Self {
            success: format!("{} updated in {}", id, collection),
        }
    }
}

/// Outcomes signalled by the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{id} already exists in {collection}")]
    AlreadyExists { collection: String, id: String },

    #[error("{id} was not found in {collection}")]
    NotFound { collection: String, id: String },

    /// The backend itself failed (connection, lock poisoning, ...)
    #[error("{backend} store error: {message}")]
    Backend { backend: String, message: String },
}

/// Storage primitives used by the entity service
///
/// Implementations must be safe for concurrent independent use; the
/// service never holds state between calls.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of `collection`, optionally restricted by `filter`
    ///
    /// An absent collection yields an empty map.
    async fn get_collection(
        &self,
        collection: &str,
        filter: Option<&FieldFilter>,
    ) -> Result<Documents, StoreError>;

    /// One document, or `None` when absent
    async fn get_entry(&self, collection: &str, id: &str) -> Result<Option<Record>, StoreError>;

    /// Add a document under `id`; fails with [`StoreError::AlreadyExists`]
    /// when the id is taken. Returns the stored document.
    async fn add_entry(&self, collection: &str, id: &str, record: Record)
    -> Result<Record, StoreError>;

    /// Replace the document under `id`; fails with [`StoreError::NotFound`]
    /// when it does not exist
    async fn update_entry(
        &self,
        collection: &str,
        id: &str,
        record: Record,
    ) -> Result<UpdateAck, StoreError>;
}

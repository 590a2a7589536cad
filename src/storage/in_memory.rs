//! In-memory implementation of DocumentStore for testing and development

use crate::core::store::{Documents, DocumentStore, FieldFilter, Record, StoreError, UpdateAck};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

const BACKEND: &str = "in-memory";

/// Seed document accepted by [`InMemoryDocumentStore::from_seed`]
///
/// ```json
/// {"collections": {"submissions": {"abc": {"name": "a", "message": "b", "location": "c"}}}}
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSeed {
    #[serde(default)]
    pub collections: HashMap<String, Documents>,
}

/// In-memory document store
///
/// Useful for testing and development. Uses RwLock for thread-safe access;
/// clones share the same underlying data.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Documents>>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with documents
    pub fn from_seed(seed: StoreSeed) -> Self {
        Self {
            collections: Arc::new(RwLock::new(seed.collections)),
        }
    }

    /// Insert or replace a raw document without any checks
    ///
    /// Meant for fixtures that need records the entity service would refuse.
    pub fn insert_raw(&self, collection: &str, id: &str, record: Record) -> Result<(), StoreError> {
        let mut collections = self.collections.write().map_err(lock_error)?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), record);
        Ok(())
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Backend {
        backend: BACKEND.to_string(),
        message: format!("Failed to acquire lock: {}", e),
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_collection(
        &self,
        collection: &str,
        filter: Option<&FieldFilter>,
    ) -> Result<Documents, StoreError> {
        let collections = self.collections.read().map_err(lock_error)?;

        let Some(documents) = collections.get(collection) else {
            return Ok(Documents::new());
        };

        Ok(documents
            .iter()
            .filter(|(_, record)| filter.is_none_or(|f| f.matches(record)))
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect())
    }

    async fn get_entry(&self, collection: &str, id: &str) -> Result<Option<Record>, StoreError> {
        let collections = self.collections.read().map_err(lock_error)?;

        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn add_entry(
        &self,
        collection: &str,
        id: &str,
        record: Record,
    ) -> Result<Record, StoreError> {
        let mut collections = self.collections.write().map_err(lock_error)?;

        let documents = collections.entry(collection.to_string()).or_default();
        if documents.contains_key(id) {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        documents.insert(id.to_string(), record.clone());
        tracing::debug!(collection, id, "Document added");

        Ok(record)
    }

    async fn update_entry(
        &self,
        collection: &str,
        id: &str,
        record: Record,
    ) -> Result<UpdateAck, StoreError> {
        let mut collections = self.collections.write().map_err(lock_error)?;

        let existing = collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        *existing = record;
        tracing::debug!(collection, id, "Document replaced");

        Ok(UpdateAck::new(id, collection))
    }
}

//! Generic CRUD service for entities
//!
//! [`EntityService`] maps between typed entities and raw documents held by a
//! [`DocumentStore`]. Every read validates what it gets back and every write
//! validates what it is given, so no invalid document is ever written and no
//! invalid document is ever returned as an entity.

use crate::core::entity::{Entity, IdGenerator, RandomIdGenerator, hydrate};
use crate::core::error::ApiError;
use crate::core::store::{DocumentStore, FieldFilter, Record, StoreError, UpdateAck};
use crate::core::validation::{apply_defaults, validate};
use axum::http::StatusCode;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// CRUD operations for one entity type over a shared document store
pub struct EntityService<T: Entity> {
    store: Arc<dyn DocumentStore>,
    ids: Arc<dyn IdGenerator>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for EntityService<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            ids: self.ids.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> EntityService<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            ids: Arc::new(RandomIdGenerator),
            _entity: PhantomData,
        }
    }

    /// Replace the id source used by [`create`](Self::create)
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn collection(&self) -> &'static str {
        T::COLLECTION
    }

    /// All valid entities of the collection
    ///
    /// Documents failing validation are skipped with a warning. An empty or
    /// absent collection is reported as [`ApiError::CollectionNotFound`].
    pub async fn list(&self) -> Result<Vec<T>, ApiError> {
        self.list_filtered(None).await
    }

    /// Valid entities whose `field` equals `value`
    pub async fn list_where(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<T>, ApiError> {
        let filter = FieldFilter::new(field, value);
        self.list_filtered(Some(&filter)).await
    }

    async fn list_filtered(&self, filter: Option<&FieldFilter>) -> Result<Vec<T>, ApiError> {
        let documents = self
            .store
            .get_collection(T::COLLECTION, filter)
            .await
            .map_err(store_error)?;

        if documents.is_empty() {
            return Err(ApiError::CollectionNotFound {
                collection: T::COLLECTION.to_string(),
            });
        }

        let mut entities = Vec::with_capacity(documents.len());
        for (id, mut record) in documents {
            record.insert("id".to_string(), Value::String(id.clone()));
            match T::from_record(record) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    tracing::warn!(
                        collection = T::COLLECTION,
                        id = %id,
                        error = %e,
                        "Skipping invalid document"
                    );
                }
            }
        }

        Ok(entities)
    }

    /// One entity by id
    ///
    /// Unlike [`list`](Self::list), a stored document that fails validation
    /// is an error here.
    pub async fn get(&self, id: &str) -> Result<T, ApiError> {
        let mut record = self
            .store
            .get_entry(T::COLLECTION, id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| ApiError::EntryNotFound {
                id: id.to_string(),
                collection: T::COLLECTION.to_string(),
            })?;

        record.insert("id".to_string(), Value::String(id.to_string()));
        T::from_record(record)
    }

    /// Store a new entity under a freshly generated id
    ///
    /// Any caller-supplied `id` is replaced.
    pub async fn create(&self, mut record: Record) -> Result<T, ApiError> {
        let id = self.ids.generate();
        record.insert("id".to_string(), Value::String(id.clone()));

        let schema = T::schema();
        validate(&record, schema)?;
        let record = apply_defaults(record, schema);

        let stored = self
            .store
            .add_entry(T::COLLECTION, &id, record)
            .await
            .map_err(store_error)?;

        tracing::info!(collection = T::COLLECTION, id = %id, "Entity created");
        hydrate(stored)
    }

    /// Replace the entity stored under `id`
    ///
    /// The path id always wins over an `id` field in the body.
    pub async fn update(&self, id: &str, mut record: Record) -> Result<UpdateAck, ApiError> {
        record.insert("id".to_string(), Value::String(id.to_string()));

        let schema = T::schema();
        validate(&record, schema)?;
        let record = apply_defaults(record, schema);

        let ack = self
            .store
            .update_entry(T::COLLECTION, id, record)
            .await
            .map_err(store_error)?;

        tracing::info!(collection = T::COLLECTION, id = %id, "Entity updated");
        Ok(ack)
    }
}

fn store_error(e: StoreError) -> ApiError {
    match e {
        StoreError::AlreadyExists { collection, id } => {
            ApiError::EntryAlreadyExists { id, collection }
        }
        StoreError::NotFound { collection, id } => ApiError::EntryNotFound { id, collection },
        StoreError::Backend { .. } => ApiError::Server {
            message: e.to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ValidationError;
    use crate::entities::{Submission, User};
    use crate::storage::InMemoryDocumentStore;
    use serde_json::json;

    struct FixedIds(&'static str);

    impl IdGenerator for FixedIds {
        fn generate(&self) -> String {
            self.0.to_string()
        }
    }

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn submission_body() -> Record {
        record(json!({
            "name": "Ada",
            "message": "Hello",
            "location": "London",
        }))
    }

    fn setup() -> (InMemoryDocumentStore, EntityService<Submission>) {
        let store = InMemoryDocumentStore::new();
        let service = EntityService::new(Arc::new(store.clone()));
        (store, service)
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_defaults() {
        let (_, service) = setup();
        let service = service.with_id_generator(Arc::new(FixedIds("abc")));

        let created = service.create(submission_body()).await.unwrap();
        assert_eq!(created.id, "abc");
        assert!(!created.allow_sharing);
        assert!(!created.allow_sns);
        assert!(!created.is_approved);
    }

    #[tokio::test]
    async fn test_create_then_get_returns_equal_entity() {
        let (_, service) = setup();
        let created = service.create(submission_body()).await.unwrap();
        let fetched = service.get(&created.id).await.unwrap();
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn test_create_overrides_supplied_id() {
        let (_, service) = setup();
        let service = service.with_id_generator(Arc::new(FixedIds("fresh")));
        let mut body = submission_body();
        body.insert("id".into(), json!("chosen"));

        let created = service.create(body).await.unwrap();
        assert_eq!(created.id, "fresh");
    }

    #[tokio::test]
    async fn test_create_rejects_missing_field() {
        let (store, service) = setup();
        let mut body = submission_body();
        body.remove("location");

        let err = service.create(body).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::Missing { .. })
        ));
        assert_eq!(err.to_string(), "Missing: location");
        assert!(store.get_collection("submissions", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_field() {
        let (_, service) = setup();
        let mut body = submission_body();
        body.insert("foo".into(), json!("bar"));

        let err = service.create(body).await.unwrap_err();
        assert_eq!(err.to_string(), "Not allowed: foo");
    }

    #[tokio::test]
    async fn test_create_with_taken_id_leaves_store_untouched() {
        let (store, service) = setup();
        let service = service.with_id_generator(Arc::new(FixedIds("abc")));
        store
            .insert_raw("submissions", "abc", record(json!({"name": "original"})))
            .unwrap();

        let err = service.create(submission_body()).await.unwrap_err();
        assert!(matches!(err, ApiError::EntryAlreadyExists { .. }));

        let kept = store.get_entry("submissions", "abc").await.unwrap().unwrap();
        assert_eq!(kept, record(json!({"name": "original"})));
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let (_, service) = setup();
        let err = service.get("nope").await.unwrap_err();
        assert_eq!(err.to_string(), "nope was not found in submissions");
    }

    #[tokio::test]
    async fn test_get_invalid_document_propagates_validation_error() {
        let (store, service) = setup();
        store
            .insert_raw("submissions", "bad", record(json!({"name": "x"})))
            .unwrap();

        let err = service.get("bad").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_skips_invalid_documents() {
        let (store, service) = setup();
        service.create(submission_body()).await.unwrap();
        store
            .insert_raw("submissions", "bad", record(json!({"name": 5})))
            .unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Ada");
    }

    #[tokio::test]
    async fn test_list_empty_collection_is_not_found() {
        let (_, service) = setup();
        let err = service.list().await.unwrap_err();
        assert!(matches!(err, ApiError::CollectionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_where_filters_on_field() {
        let store = InMemoryDocumentStore::new();
        store
            .insert_raw(
                "users",
                "a",
                record(json!({"email": "a@x", "isAdmin": true})),
            )
            .unwrap();
        store
            .insert_raw(
                "users",
                "b",
                record(json!({"email": "b@x", "isAdmin": false})),
            )
            .unwrap();
        let users: EntityService<User> = EntityService::new(Arc::new(store));

        let admins = users.list_where("isAdmin", true).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].email, "a@x");
    }

    #[tokio::test]
    async fn test_update_pins_path_id_and_acknowledges() {
        let (store, service) = setup();
        let service = service.with_id_generator(Arc::new(FixedIds("abc")));
        service.create(submission_body()).await.unwrap();

        let mut body = submission_body();
        body.insert("id".into(), json!("other"));
        body.insert("isApproved".into(), json!(true));

        let ack = service.update("abc", body).await.unwrap();
        assert_eq!(ack.success, "abc updated in submissions");

        let updated = service.get("abc").await.unwrap();
        assert!(updated.is_approved);
        assert!(store.get_entry("submissions", "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let (_, service) = setup();
        let err = service.update("nope", submission_body()).await.unwrap_err();
        assert!(matches!(err, ApiError::EntryNotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_rejects_wrong_type() {
        let (_, service) = setup();
        let mut body = submission_body();
        body.insert("location".into(), json!(12));

        let err = service.update("abc", body).await.unwrap_err();
        assert_eq!(err.to_string(), "location is integer, should be string.");
    }
}

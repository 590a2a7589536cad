//! Core module containing fundamental traits and types for the framework

pub mod auth;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod field;
pub mod service;
pub mod store;
pub mod validation;

pub use auth::{TokenSigner, authenticated_bearer, create_api_token, verify_bearer};
pub use entity::{Entity, IdGenerator, RandomIdGenerator};
pub use error::{ApiError, ErrorResponse, TypeMismatch, ValidationError};
pub use extractors::{AdminBearer, ApiPath, ApiQuery};
pub use field::{FieldSchema, FieldSpec, FieldType};
pub use service::EntityService;
pub use store::{DocumentStore, Documents, FieldFilter, Record, StoreError, UpdateAck};

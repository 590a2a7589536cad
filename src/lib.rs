//! # springapi
//!
//! A small document-backed API for collecting submissions, administered
//! through an OAuth2 login and locally issued bearer tokens.
//!
//! ## Features
//!
//! - **Declarative Schemas**: every entity declares its fields once; writes
//!   are validated and defaults injected before anything reaches the store
//! - **Generic CRUD**: one `EntityService<T>` serves every entity type
//! - **Typed Errors**: a closed `ApiError` taxonomy renders uniform
//!   `{error, message}` bodies with fixed status codes
//! - **OAuth2 Login**: authorization-code handshake with an email allow-list
//! - **Admin Tokens**: signed bearer tokens checked against the store on
//!   every protected request
//! - **Pluggable Storage**: any `DocumentStore`; an in-memory one is included
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use springapi::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     ServerBuilder::new(config).serve().await
//! }
//! ```
//!
//! Declaring an entity:
//!
//! ```rust,ignore
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! pub struct Token {
//!     pub id: String,
//!     pub token: String,
//! }
//!
//! impl_entity!(Token, "tokens", {
//!     "id" => FieldSpec::required(FieldType::String),
//!     "token" => FieldSpec::required(FieldType::String),
//! });
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod oauth;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        auth::{TokenSigner, authenticated_bearer, create_api_token, verify_bearer},
        entity::{Entity, IdGenerator, RandomIdGenerator},
        error::{ApiError, ErrorResponse, ValidationError},
        extractors::{AdminBearer, ApiPath, ApiQuery},
        field::{FieldSchema, FieldSpec, FieldType},
        service::EntityService,
        store::{DocumentStore, FieldFilter, Record, StoreError, UpdateAck},
        validation::{JsonRecord, apply_defaults, validate},
    };

    // === Macros ===
    pub use crate::impl_entity;

    // === Entities ===
    pub use crate::entities::{Submission, Token, User};

    // === OAuth ===
    pub use crate::oauth::{
        AdminUserAllowList, AuthorizationHandshake, EmailAllowList, GoogleOAuthProvider,
        OAuthProvider, StaticAllowList,
    };

    // === Storage ===
    pub use crate::storage::InMemoryDocumentStore;

    // === Config ===
    pub use crate::config::{
        AppConfig, ConfigError, Environment, OAuthCredentials, decode_json_uri, encode_json_uri,
    };

    // === Server ===
    pub use crate::server::{API_PREFIX, AppState, ServerBuilder, app};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}

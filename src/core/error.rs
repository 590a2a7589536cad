//! Typed error handling for springapi
//!
//! Every fallible operation in the crate returns [`ApiError`]. Each variant
//! carries a fixed HTTP status, a stable machine-readable code and a message
//! computed from its fields. The [`IntoResponse`] impl is the single place
//! where an error becomes an HTTP response.
//!
//! # Error Categories
//!
//! - Store outcomes: [`ApiError::CollectionNotFound`], [`ApiError::EntryNotFound`],
//!   [`ApiError::EntryAlreadyExists`]
//! - Schema violations: [`ApiError::Validation`] wrapping a [`ValidationError`]
//! - OAuth handshake: [`ApiError::Authorization`], [`ApiError::AuthProviderResponse`]
//! - Bearer checks: [`ApiError::MissingAuthorization`],
//!   [`ApiError::InvalidAuthHeaderValue`], [`ApiError::InvalidAuthorization`]
//! - Configuration: [`ApiError::InvalidJsonUri`]
//! - Everything else: [`ApiError::Server`] and [`ApiError::Unexpected`]
//!
//! # Example
//!
//! ```rust,ignore
//! match service.get("abc").await {
//!     Ok(submission) => println!("{:?}", submission),
//!     Err(ApiError::EntryNotFound { id, .. }) => println!("{} is gone", id),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of every message produced by a failed OAuth token exchange
pub const TOKEN_EXCHANGE_FAILED: &str = "Something went wrong with token exchange: ";

/// Message returned to clients for failures that are not part of the taxonomy
pub const UNEXPECTED_SERVER_ERROR: &str = "Unexpected server error";

/// The main error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Collection {collection} not found")]
    CollectionNotFound { collection: String },

    #[error("{id} was not found in {collection}")]
    EntryNotFound { id: String, collection: String },

    #[error("{id} already exists in {collection}")]
    EntryAlreadyExists { id: String, collection: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The OAuth handshake failed; `cause` is the wrapped provider or
    /// validation failure
    #[error("{cause}")]
    Authorization { cause: String },

    /// The identity provider answered with a non-conforming body
    #[error("{message}")]
    AuthProviderResponse { message: String },

    #[error("{message}")]
    InvalidJsonUri { message: String },

    #[error("Request requires Authorization header")]
    MissingAuthorization,

    #[error("Requires bearer token")]
    InvalidAuthHeaderValue,

    #[error("You are not authorized to perform this action")]
    InvalidAuthorization,

    /// A failure with an explicit status, e.g. a store backend outage
    #[error("{message}")]
    Server { message: String, status: StatusCode },

    /// Anything the taxonomy does not recognise; never shown to clients
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Error body sent to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Wrap any failure raised inside the OAuth handshake
    pub fn authorization(cause: impl fmt::Display) -> Self {
        ApiError::Authorization {
            cause: cause.to_string(),
        }
    }

    pub fn provider_response(message: impl Into<String>) -> Self {
        ApiError::AuthProviderResponse {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::CollectionNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::EntryNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::EntryAlreadyExists { .. } => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Authorization { .. } => StatusCode::BAD_REQUEST,
            ApiError::AuthProviderResponse { .. } => StatusCode::BAD_GATEWAY,
            ApiError::InvalidJsonUri { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingAuthorization => StatusCode::UNAUTHORIZED,
            ApiError::InvalidAuthHeaderValue => StatusCode::BAD_REQUEST,
            ApiError::InvalidAuthorization => StatusCode::FORBIDDEN,
            ApiError::Server { status, .. } => *status,
            ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::CollectionNotFound { .. } => "collection_not_found",
            ApiError::EntryNotFound { .. } => "entry_not_found",
            ApiError::EntryAlreadyExists { .. } => "entry_already_exists",
            ApiError::Validation(_) => "validation_failure",
            ApiError::Authorization { .. } => "authorization_failure",
            ApiError::AuthProviderResponse { .. } => "auth_provider_failure",
            ApiError::InvalidJsonUri { .. } => "invalid_json_uri",
            ApiError::MissingAuthorization => "unauthorized",
            ApiError::InvalidAuthHeaderValue => "bad_request",
            ApiError::InvalidAuthorization => "forbidden",
            ApiError::Server { .. } => "server_error",
            ApiError::Unexpected(_) => "server_error",
        }
    }

    /// Message shown to clients
    ///
    /// Differs from `Display` for token-exchange failures, which carry a
    /// fixed prefix, and for unexpected failures, which are never detailed.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Authorization { cause } => format!("{}{}", TOKEN_EXCHANGE_FAILED, cause),
            ApiError::Unexpected(_) => UNEXPECTED_SERVER_ERROR.to_string(),
            other => other.to_string(),
        }
    }

    /// Convert to an error response body
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.error_code().to_string(),
            message: self.client_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Error running route");
        } else {
            tracing::debug!(error = %self, status = %status, "Request failed");
        }
        (status, Json(self.to_response())).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ValidationError::InvalidRequest {
            message: rejection.body_text(),
        }
        .into()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ValidationError::InvalidRequest {
            message: rejection.body_text(),
        }
        .into()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A field whose value does not carry the declared type
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TypeMismatch {
    pub field: String,
    pub actual: String,
    pub expected: String,
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is {}, should be {}.",
            self.field, self.actual, self.expected
        )
    }
}

/// Schema and input validation failures
///
/// Only one kind is ever reported per validation call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Fields not declared in the schema, sorted
    #[error("Not allowed: {}", .fields.join(", "))]
    NotAllowed { fields: Vec<String> },

    /// Required fields absent from the record, sorted
    #[error("Missing: {}", .fields.join(", "))]
    Missing { fields: Vec<String> },

    /// Fields with the wrong runtime type, sorted by field name
    #[error("{}", join_mismatches(.mismatches))]
    Type { mismatches: Vec<TypeMismatch> },

    /// A single value rejected outright (bad credentials, unknown email)
    #[error("{value}")]
    InvalidValue { value: String },

    /// The request body could not be read as a JSON object
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// The path or query string could not be parsed
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

fn join_mismatches(mismatches: &[TypeMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

impl ValidationError {
    /// Machine-readable kind of the violation
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::NotAllowed { .. } => "not_allowed",
            ValidationError::Missing { .. } => "missing",
            ValidationError::Type { .. } => "type",
            ValidationError::InvalidValue { .. } => "invalid_value",
            ValidationError::InvalidBody { .. } => "invalid_body",
            ValidationError::InvalidRequest { .. } => "invalid_request",
        }
    }

    pub fn invalid_value(value: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        let err = ValidationError::Missing {
            fields: vec!["location".into()],
        };
        assert_eq!(err.to_string(), "Missing: location");
        assert_eq!(err.kind(), "missing");

        let err = ValidationError::NotAllowed {
            fields: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "Not allowed: a, b");

        let err = ValidationError::Type {
            mismatches: vec![
                TypeMismatch {
                    field: "location".into(),
                    actual: "integer".into(),
                    expected: "string".into(),
                },
                TypeMismatch {
                    field: "name".into(),
                    actual: "null".into(),
                    expected: "string".into(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "location is integer, should be string. name is null, should be string."
        );
    }

    #[test]
    fn test_store_error_messages() {
        let err = ApiError::EntryAlreadyExists {
            id: "abc".into(),
            collection: "submissions".into(),
        };
        assert_eq!(err.to_string(), "abc already exists in submissions");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = ApiError::EntryNotFound {
            id: "abc".into(),
            collection: "submissions".into(),
        };
        assert_eq!(err.to_string(), "abc was not found in submissions");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ApiError::CollectionNotFound {
            collection: "tokens".into(),
        };
        assert_eq!(err.to_string(), "Collection tokens not found");
    }

    #[test]
    fn test_bearer_errors_render_fixed_bodies() {
        let cases = [
            (
                ApiError::MissingAuthorization,
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Request requires Authorization header",
            ),
            (
                ApiError::InvalidAuthHeaderValue,
                StatusCode::BAD_REQUEST,
                "bad_request",
                "Requires bearer token",
            ),
            (
                ApiError::InvalidAuthorization,
                StatusCode::FORBIDDEN,
                "forbidden",
                "You are not authorized to perform this action",
            ),
        ];
        for (err, status, code, message) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(
                err.to_response(),
                ErrorResponse {
                    error: code.to_string(),
                    message: message.to_string(),
                }
            );
        }
    }

    #[test]
    fn test_authorization_error_message_is_prefixed() {
        let err = ApiError::authorization("Bad token");
        assert_eq!(err.to_string(), "Bad token");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_response().message,
            "Something went wrong with token exchange: Bad token"
        );
    }

    #[test]
    fn test_unexpected_error_is_opaque() {
        let err = ApiError::from(anyhow::anyhow!("database password is hunter2"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.to_response();
        assert_eq!(body.message, "Unexpected server error");
        assert!(!body.message.contains("hunter2"));
    }

    #[test]
    fn test_server_error_keeps_its_status() {
        let err = ApiError::Server {
            message: "store unavailable".into(),
            status: StatusCode::SERVICE_UNAVAILABLE,
        };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), "server_error");
    }

    #[test]
    fn test_validation_error_converts() {
        let err: ApiError = ValidationError::invalid_value("Bad credentials").into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_response().error, "validation_failure");
        assert_eq!(err.to_response().message, "Bad credentials");
    }
}

//! Axum extractor for untrusted record payloads
//!
//! Request bodies enter the crate as a JSON object ([`Record`]). Schema
//! checks happen later, in the entity service, so that routes and internal
//! callers share one validation path. This extractor only guarantees that
//! the body is a JSON object and reports anything else as a
//! [`ValidationError::InvalidBody`].

use crate::core::error::{ApiError, ValidationError};
use crate::core::store::Record;
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde_json::Value;

/// A request body parsed as a JSON object
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_submission(
///     State(state): State<AppState>,
///     JsonRecord(record): JsonRecord,
/// ) -> Result<(StatusCode, Json<Submission>), ApiError> {
///     // record has not been checked against any schema yet
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonRecord(pub Record);

impl<S> FromRequest<S> for JsonRecord
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload): Json<Value> = Json::from_request(req, state).await.map_err(|e| {
            ValidationError::InvalidBody {
                message: e.body_text(),
            }
        })?;

        match payload {
            Value::Object(record) => Ok(JsonRecord(record)),
            other => Err(ValidationError::InvalidBody {
                message: format!(
                    "expected a JSON object, got {}",
                    crate::core::field::value_type_name(&other)
                ),
            }
            .into()),
        }
    }
}

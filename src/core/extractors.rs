//! Axum extractors for request authorization and request parts
//!
//! Every rejection here is an [`ApiError`], so malformed requests get the
//! same JSON error body as failures raised by handlers.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::core::auth::verify_bearer;
use crate::core::error::ApiError;
use crate::core::service::EntityService;
use crate::entities::Token;

/// Guard for admin-only routes
///
/// Extraction succeeds only when the `Authorization` header carries a stored
/// admin token; otherwise the request is rejected with the matching
/// 401/400/403 error body before the handler runs.
///
/// ```rust,ignore
/// async fn list_submissions(_admin: AdminBearer, State(state): State<AppState>) { .. }
/// ```
#[derive(Debug, Clone)]
pub struct AdminBearer {
    pub token: String,
}

impl<S> FromRequestParts<S> for AdminBearer
where
    EntityService<Token>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = EntityService::<Token>::from_ref(state);
        let token = verify_bearer(&parts.headers, &tokens).await?;
        Ok(Self { token })
    }
}

/// Query string extractor rejecting with [`ApiError`]
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameter extractor rejecting with [`ApiError`]
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

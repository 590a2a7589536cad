//! HTTP handlers
//!
//! Handlers only parse the request, call into the core and shape the
//! response. Every failure is an [`ApiError`], rendered by its
//! `IntoResponse` impl.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::auth::{authenticated_bearer, create_api_token};
use crate::core::error::ApiError;
use crate::core::extractors::{AdminBearer, ApiPath, ApiQuery};
use crate::core::store::UpdateAck;
use crate::core::validation::JsonRecord;
use crate::entities::Submission;
use crate::server::host::AppState;

/// Response header carrying a freshly issued admin token
pub const TOKEN_HEADER: &str = "token";

/// Body of `GET /submissions`
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionsResponse {
    pub submissions: Vec<Submission>,
}

/// Query of `GET /auth-callback`
#[derive(Debug, Deserialize)]
pub struct AuthCallbackParams {
    pub code: Option<String>,
}

pub async fn healthcheck() -> Json<Value> {
    Json(json!({"success": true}))
}

pub async fn list_submissions(
    _admin: AdminBearer,
    State(state): State<AppState>,
) -> Result<Json<SubmissionsResponse>, ApiError> {
    let submissions = state.submissions.list().await?;
    Ok(Json(SubmissionsResponse { submissions }))
}

pub async fn get_submission(
    _admin: AdminBearer,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Submission>, ApiError> {
    Ok(Json(state.submissions.get(&id).await?))
}

/// Public: anyone may submit
pub async fn create_submission(
    State(state): State<AppState>,
    JsonRecord(record): JsonRecord,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    let created = state.submissions.create(record).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_submission(
    _admin: AdminBearer,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    JsonRecord(record): JsonRecord,
) -> Result<Json<UpdateAck>, ApiError> {
    Ok(Json(state.submissions.update(&id, record).await?))
}

/// Start the OAuth handshake, unless the caller is already authorized
pub async fn request_auth_code(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if authenticated_bearer(&headers, &state.tokens).await {
        return Ok((
            StatusCode::OK,
            Json(json!({"status": "Valid token found in request header"})),
        )
            .into_response());
    }

    let client_id = state.config.oauth_client_id()?;
    let redirect_host = state.redirect_host(&headers);
    let url = state.handshake.authorization_url(&redirect_host, &client_id)?;

    tracing::debug!(redirect = %url, "Redirecting to identity provider");
    Ok((StatusCode::FOUND, [(LOCATION, url)]).into_response())
}

/// Finish the OAuth handshake and hand out an admin token
pub async fn auth_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiQuery(params): ApiQuery<AuthCallbackParams>,
) -> Result<Response, ApiError> {
    let credentials = state.config.credentials().map_err(ApiError::authorization)?;
    let redirect_host = state.redirect_host(&headers);

    let token = create_api_token(
        &state.handshake,
        &state.signer,
        &state.tokens,
        params.code.as_deref(),
        &credentials,
        &redirect_host,
    )
    .await?;

    let value = HeaderValue::from_str(&token)
        .map_err(|e| anyhow::anyhow!("issued token is not a valid header value: {}", e))?;

    let mut response = StatusCode::OK.into_response();
    response
        .headers_mut()
        .insert(HeaderName::from_static(TOKEN_HEADER), value);
    Ok(response)
}

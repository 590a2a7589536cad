//! Admin bearer tokens
//!
//! A successful OAuth handshake yields a verified email. The email is signed
//! into a compact HS256 token which is stored as a [`Token`] entity; the set
//! of stored tokens is the bearer allow-list checked on protected routes.
//! Tokens never expire.

use crate::config::OAuthCredentials;
use crate::core::error::ApiError;
use crate::core::service::EntityService;
use crate::entities::Token;
use crate::oauth::AuthorizationHandshake;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Issuer claim of every admin token
pub const TOKEN_ISSUER: &str = "springapi";

const BEARER_PREFIX: &str = "Bearer ";

/// Claims carried by an admin token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iss: String,
    /// Issued at (unix timestamp)
    pub iat: i64,
}

/// Signs admin tokens with a shared secret
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["iss"]);
        validation.set_issuer(&[TOKEN_ISSUER]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token bound to `email`
    pub fn sign(&self, email: &str) -> Result<String, ApiError> {
        let claims = Claims {
            email: email.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: chrono::Utc::now().timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("jwt encode: {}", e).into())
    }

    /// Check the signature and issuer of a token and return its claims
    pub fn decode(&self, token: &str) -> Result<Claims, ApiError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| ApiError::InvalidAuthorization)
    }
}

/// Run the handshake, then issue and store an admin token for the verified email
pub async fn create_api_token(
    handshake: &AuthorizationHandshake,
    signer: &TokenSigner,
    tokens: &EntityService<Token>,
    code: Option<&str>,
    credentials: &OAuthCredentials,
    redirect_host: &str,
) -> Result<String, ApiError> {
    let email = handshake
        .exchange_oauth_token(code, credentials, redirect_host)
        .await?;

    let signed = signer.sign(&email)?;

    let mut record = Map::new();
    record.insert("token".to_string(), Value::String(signed.clone()));
    let stored = tokens.create(record).await?;

    tracing::info!(email = %email, token_id = %stored.id, "Admin token issued");
    Ok(signed)
}

/// Bearer value of the `Authorization` header
///
/// Fails with [`ApiError::MissingAuthorization`] when the header is absent
/// and [`ApiError::InvalidAuthHeaderValue`] when it is not a bearer value.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(ApiError::MissingAuthorization)?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .ok_or(ApiError::InvalidAuthHeaderValue)
}

/// Require a stored admin token in the `Authorization` header
///
/// Checked against the store on every call. Returns the token.
pub async fn verify_bearer(
    headers: &HeaderMap,
    tokens: &EntityService<Token>,
) -> Result<String, ApiError> {
    let presented = bearer_token(headers)?;

    let known = match tokens.list().await {
        Ok(known) => known,
        Err(ApiError::CollectionNotFound { .. }) => Vec::new(),
        Err(e) => return Err(e),
    };

    if known.iter().any(|t| t.token == presented) {
        Ok(presented.to_string())
    } else {
        Err(ApiError::InvalidAuthorization)
    }
}

/// Whether the request already carries a valid admin token
pub async fn authenticated_bearer(headers: &HeaderMap, tokens: &EntityService<Token>) -> bool {
    match verify_bearer(headers, tokens).await {
        Ok(_) => true,
        Err(ApiError::MissingAuthorization)
        | Err(ApiError::InvalidAuthHeaderValue)
        | Err(ApiError::InvalidAuthorization) => false,
        Err(e) => {
            tracing::error!(error = ?e, "Bearer check failed");
            false
        }
    }
}

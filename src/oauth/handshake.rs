//! OAuth2 authorization-code handshake
//!
//! Three stages, none of which keep state on the server: redirect the user
//! agent to the provider, trade the returned code for an access token, then
//! look up the user's email and check it against the allow-list.

use crate::config::OAuthCredentials;
use crate::core::error::{ApiError, ValidationError};
use crate::oauth::allow_list::EmailAllowList;
use crate::oauth::provider::OAuthProvider;
use std::sync::Arc;

/// Composes an [`OAuthProvider`] with an [`EmailAllowList`]
#[derive(Clone)]
pub struct AuthorizationHandshake {
    provider: Arc<dyn OAuthProvider>,
    allow_list: Arc<dyn EmailAllowList>,
}

impl AuthorizationHandshake {
    pub fn new(provider: Arc<dyn OAuthProvider>, allow_list: Arc<dyn EmailAllowList>) -> Self {
        Self {
            provider,
            allow_list,
        }
    }

    /// Redirect stage
    pub fn authorization_url(&self, redirect_host: &str, client_id: &str) -> Result<String, ApiError> {
        self.provider.authorization_url(redirect_host, client_id)
    }

    /// Exchange and identity stages
    ///
    /// Returns the verified email. Provider and validation failures are
    /// re-raised as [`ApiError::Authorization`].
    pub async fn exchange_oauth_token(
        &self,
        code: Option<&str>,
        credentials: &OAuthCredentials,
        redirect_host: &str,
    ) -> Result<String, ApiError> {
        self.verified_email(code, credentials, redirect_host)
            .await
            .map_err(|e| match e {
                ApiError::AuthProviderResponse { .. } => ApiError::authorization(e),
                ApiError::Validation(ValidationError::InvalidValue { value }) => {
                    ApiError::authorization(format!("User associated with {} is not authorized", value))
                }
                ApiError::Validation(other) => ApiError::authorization(other),
                other => other,
            })
    }

    async fn verified_email(
        &self,
        code: Option<&str>,
        credentials: &OAuthCredentials,
        redirect_host: &str,
    ) -> Result<String, ApiError> {
        let code = code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ApiError::provider_response("Authorization code not found"))?;

        let access_token = self
            .provider
            .exchange_code(code, credentials, redirect_host)
            .await?;
        let email = self.provider.user_email(&access_token).await?;

        if !self.allow_list.is_authorized(&email).await? {
            tracing::warn!(email = %email, "Rejected login from unlisted email");
            return Err(ValidationError::invalid_value(email).into());
        }

        Ok(email)
    }
}

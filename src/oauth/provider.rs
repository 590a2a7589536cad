//! Identity provider client
//!
//! The handshake only needs three things from a provider: an authorization
//! URL to redirect to, a code-for-token exchange and a user-info lookup.
//! [`GoogleOAuthProvider`] speaks Google's OAuth2 endpoints; every endpoint
//! can be pointed elsewhere for testing.

use crate::config::OAuthCredentials;
use crate::core::error::ApiError;
use crate::server::API_VERSION;
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

pub const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Scopes requested from the provider: email and profile
pub const OAUTH_SCOPES: &str =
    "https://www.googleapis.com/auth/userinfo.email https://www.googleapis.com/auth/userinfo.profile";

/// Callback URL registered with the provider for a given public base URL
pub fn callback_url(redirect_host: &str) -> String {
    format!("{}api/{}/auth-callback", redirect_host, API_VERSION)
}

/// Capabilities of an OAuth2 authorization-code provider
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// URL the user agent is redirected to in order to grant access
    fn authorization_url(&self, redirect_host: &str, client_id: &str) -> Result<String, ApiError>;

    /// Trade an authorization code for an access token
    async fn exchange_code(
        &self,
        code: &str,
        credentials: &OAuthCredentials,
        redirect_host: &str,
    ) -> Result<String, ApiError>;

    /// Email of the user owning `access_token`
    async fn user_email(&self, access_token: &str) -> Result<String, ApiError>;
}

/// Google OAuth2 client
#[derive(Debug, Clone)]
pub struct GoogleOAuthProvider {
    client: reqwest::Client,
    authorize_url: String,
    token_url: String,
    userinfo_url: String,
}

impl Default for GoogleOAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleOAuthProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            authorize_url: GOOGLE_AUTHORIZE_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }

    pub fn with_authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_userinfo_url(mut self, url: impl Into<String>) -> Self {
        self.userinfo_url = url.into();
        self
    }

    /// Point every endpoint at `base`, keeping Google's paths
    pub fn with_base_url(self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.with_authorize_url(format!("{}/o/oauth2/v2/auth", base))
            .with_token_url(format!("{}/token", base))
            .with_userinfo_url(format!("{}/oauth2/v2/userinfo", base))
    }

    async fn fetch_json(&self, request: reqwest::RequestBuilder) -> Result<Value, reqwest::Error> {
        request.send().await?.json::<Value>().await
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthProvider {
    fn authorization_url(&self, redirect_host: &str, client_id: &str) -> Result<String, ApiError> {
        let redirect_uri = callback_url(redirect_host);
        let url = Url::parse_with_params(
            &self.authorize_url,
            [
                ("access_type", "offline"),
                ("client_id", client_id),
                ("redirect_uri", redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", OAUTH_SCOPES),
            ],
        )
        .map_err(|e| anyhow::anyhow!("invalid authorize url {}: {}", self.authorize_url, e))?;

        Ok(url.into())
    }

    async fn exchange_code(
        &self,
        code: &str,
        credentials: &OAuthCredentials,
        redirect_host: &str,
    ) -> Result<String, ApiError> {
        let redirect_uri = callback_url(redirect_host);
        let form = [
            ("code", code),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let failed = || ApiError::provider_response(format!("Error retrieving token from {}", self.token_url));

        let body = self
            .fetch_json(self.client.post(&self.token_url).form(&form))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, url = %self.token_url, "Token exchange request failed");
                failed()
            })?;

        body.get("access_token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(failed)
    }

    async fn user_email(&self, access_token: &str) -> Result<String, ApiError> {
        let failed = || {
            ApiError::provider_response(format!(
                "Error retrieving user info from {}",
                self.userinfo_url
            ))
        };

        let request = self
            .client
            .get(&self.userinfo_url)
            .query(&[("access_token", access_token)]);

        let body = self.fetch_json(request).await.map_err(|e| {
            tracing::warn!(error = %e, url = %self.userinfo_url, "User info request failed");
            failed()
        })?;

        body.get("email")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> OAuthCredentials {
        OAuthCredentials {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    #[test]
    fn test_authorization_url_parameters() {
        let provider = GoogleOAuthProvider::new();
        let url = provider
            .authorization_url("http://localhost:5000/", "client")
            .unwrap();
        let url = Url::parse(&url).unwrap();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            params,
            vec![
                ("access_type".to_string(), "offline".to_string()),
                ("client_id".to_string(), "client".to_string()),
                (
                    "redirect_uri".to_string(),
                    "http://localhost:5000/api/v1/auth-callback".to_string()
                ),
                ("response_type".to_string(), "code".to_string()),
                ("scope".to_string(), OAUTH_SCOPES.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_exchange_code_returns_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=abc"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "at"})),
            )
            .mount(&server)
            .await;

        let provider = GoogleOAuthProvider::new().with_base_url(&server.uri());
        let token = provider
            .exchange_code("abc", &credentials(), "http://localhost/")
            .await
            .unwrap();
        assert_eq!(token, "at");
    }

    #[tokio::test]
    async fn test_exchange_code_without_access_token_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let provider = GoogleOAuthProvider::new().with_base_url(&server.uri());
        let err = provider
            .exchange_code("abc", &credentials(), "http://localhost/")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::AuthProviderResponse { .. }));
        assert_eq!(
            err.to_string(),
            format!("Error retrieving token from {}/token", server.uri())
        );
    }

    #[tokio::test]
    async fn test_user_email() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v2/userinfo"))
            .and(query_param("access_token", "at"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"email": "admin@example.com"})),
            )
            .mount(&server)
            .await;

        let provider = GoogleOAuthProvider::new().with_base_url(&server.uri());
        assert_eq!(provider.user_email("at").await.unwrap(), "admin@example.com");
    }

    #[tokio::test]
    async fn test_user_email_missing_from_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v2/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let provider = GoogleOAuthProvider::new().with_base_url(&server.uri());
        let err = provider.user_email("at").await.unwrap_err();
        assert!(err.to_string().starts_with("Error retrieving user info from "));
    }
}

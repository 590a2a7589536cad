//! Shared application state
//!
//! Built once by the [`ServerBuilder`](super::ServerBuilder) and cloned
//! into every request. Nothing in it is mutated after startup; the document
//! store behind the entity services is the only shared mutable resource.

use crate::config::AppConfig;
use crate::core::auth::TokenSigner;
use crate::core::service::EntityService;
use crate::entities::{Submission, Token};
use crate::oauth::AuthorizationHandshake;
use axum::extract::FromRef;
use axum::http::HeaderMap;
use axum::http::header::HOST;
use std::sync::Arc;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// State available to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub submissions: EntityService<Submission>,
    pub tokens: EntityService<Token>,
    pub handshake: AuthorizationHandshake,
    pub signer: TokenSigner,
}

impl AppState {
    /// Base URL the provider redirects back to, ending in `/`
    ///
    /// The configured public URL when set, otherwise derived from the
    /// request's `Host` header. The scheme follows the first
    /// `X-Forwarded-Proto` value so a TLS-terminating proxy keeps `https`.
    pub fn redirect_host(&self, headers: &HeaderMap) -> String {
        if let Some(url) = &self.config.public_url {
            return url.clone();
        }
        let host = headers
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("localhost");
        let scheme = headers
            .get(FORWARDED_PROTO)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|proto| proto.eq_ignore_ascii_case("https"))
            .map_or("http", |_| "https");
        format!("{}://{}/", scheme, host)
    }
}

impl FromRef<AppState> for EntityService<Token> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

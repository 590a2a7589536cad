//! ServerBuilder for fluent API to build HTTP servers

use super::host::AppState;
use super::router::build_api_routes;
use super::API_PREFIX;
use crate::config::{AppConfig, ConfigError};
use crate::core::auth::TokenSigner;
use crate::core::entity::{Entity, IdGenerator};
use crate::core::error::ApiError;
use crate::core::service::EntityService;
use crate::core::store::DocumentStore;
use crate::entities::{Submission, Token, User};
use crate::oauth::{
    AdminUserAllowList, AuthorizationHandshake, EmailAllowList, GoogleOAuthProvider,
    OAuthProvider, StaticAllowList,
};
use anyhow::Result;
use axum::Router;
use axum::response::{IntoResponse, Response};
use std::any::Any;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the HTTP application
///
/// Every collaborator has a default derived from the configuration: the
/// store from `DATABASE_URI`, Google as identity provider and the allow-list
/// from `AUTHORIZED_EMAILS` (admin users when unset).
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new(AppConfig::from_env()?)
///     .with_store(Arc::new(InMemoryDocumentStore::new()))
///     .serve()
///     .await?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    store: Option<Arc<dyn DocumentStore>>,
    provider: Option<Arc<dyn OAuthProvider>>,
    allow_list: Option<Arc<dyn EmailAllowList>>,
    id_generator: Option<Arc<dyn IdGenerator>>,
}

impl ServerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: None,
            provider: None,
            allow_list: None,
            id_generator: None,
        }
    }

    /// Use this document store instead of the one named by `DATABASE_URI`
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_oauth_provider(mut self, provider: Arc<dyn OAuthProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_allow_list(mut self, allow_list: Arc<dyn EmailAllowList>) -> Self {
        self.allow_list = Some(allow_list);
        self
    }

    /// Id source for every entity service
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(ids);
        self
    }

    /// Assemble the shared state
    pub fn build_state(self) -> Result<AppState, ConfigError> {
        let store = match self.store.clone() {
            Some(store) => store,
            None => self.config.document_store()?,
        };

        let submissions: EntityService<Submission> = self.service(&store);
        let tokens: EntityService<Token> = self.service(&store);
        let users: EntityService<User> = self.service(&store);

        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(GoogleOAuthProvider::new()));

        let allow_list: Arc<dyn EmailAllowList> =
            match (self.allow_list, &self.config.authorized_emails) {
                (Some(list), _) => list,
                (None, Some(emails)) => Arc::new(StaticAllowList::new(emails.iter().cloned())),
                (None, None) => Arc::new(AdminUserAllowList::new(users)),
            };

        let signer = TokenSigner::new(&self.config.token);

        tracing::info!(
            environment = %self.config.environment,
            "Application state ready"
        );

        Ok(AppState {
            config: Arc::new(self.config),
            submissions,
            tokens,
            handshake: AuthorizationHandshake::new(provider, allow_list),
            signer,
        })
    }

    fn service<T: Entity>(&self, store: &Arc<dyn DocumentStore>) -> EntityService<T> {
        let service = EntityService::new(store.clone());
        match &self.id_generator {
            Some(ids) => service.with_id_generator(ids.clone()),
            None => service,
        }
    }

    /// Build the router with every route nested under the API prefix
    pub fn build(self) -> Result<Router, ConfigError> {
        let state = self.build_state()?;
        Ok(app(state))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds to the configured address and stops on SIGTERM or Ctrl+C.
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Wrap the API routes in the middleware stack
pub fn app(state: AppState) -> Router {
    Router::new().nest(API_PREFIX, build_api_routes(state)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(CorsLayer::permissive()),
    )
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ApiError::from(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

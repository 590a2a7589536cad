//! Configuration loading and management
//!
//! [`AppConfig`] is built once at startup, from environment variables or a
//! YAML document, and shared read-only by every request.

pub mod json_uri;

pub use json_uri::{decode_json_uri, encode_json_uri};

use crate::core::error::{ApiError, ValidationError};
use crate::core::store::DocumentStore;
use crate::storage::{InMemoryDocumentStore, StoreSeed};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Scheme of `DATABASE_URI` selecting the in-memory document store
pub const MEMORY_SCHEME: &str = "memory";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting {name}")]
    MissingVar { name: String },

    #[error("Unknown environment '{value}', expected production, development or testing")]
    InvalidEnvironment { value: String },

    #[error("Invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },

    #[error("Unsupported document store scheme '{scheme}'")]
    UnsupportedStore { scheme: String },

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
    Testing,
}

impl Environment {
    /// Debug behaviour is only enabled in development
    pub fn is_debug(&self) -> bool {
        matches!(self, Environment::Development)
    }

    /// Default `tracing` filter directive for this environment
    pub fn default_log_filter(&self) -> &'static str {
        if self.is_debug() { "debug" } else { "info" }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
            Environment::Testing => "testing",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "development" => Ok(Environment::Development),
            "testing" => Ok(Environment::Testing),
            _ => Err(ConfigError::InvalidEnvironment {
                value: s.to_string(),
            }),
        }
    }
}

/// OAuth client registration, as found in the provider's client-secret
/// document `{"web": {"client_id": .., "client_secret": ..}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl OAuthCredentials {
    /// Read credentials from a decoded client-secret document
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ApiError> {
        let web = value.get("web");
        let field = |name: &str| {
            web.and_then(|w| w.get(name))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        let client_id = field("client_id").ok_or_else(bad_credentials)?;
        Ok(Self {
            client_id,
            client_secret: field("client_secret").unwrap_or_default(),
        })
    }

    /// Decode credentials carried in a `scheme://base64(json)` URI
    pub fn from_json_uri(uri: &str) -> Result<Self, ApiError> {
        let (_, value) = decode_json_uri(uri)?;
        Self::from_json(&value)
    }
}

fn bad_credentials() -> ApiError {
    ValidationError::invalid_value("Bad credentials").into()
}

/// Process-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    /// `scheme://base64(json)` selecting and seeding the document store;
    /// an empty in-memory store when absent
    #[serde(default)]
    pub database_uri: Option<String>,

    /// `scheme://base64(json)` carrying the OAuth client-secret document
    #[serde(default)]
    pub auth: Option<String>,

    /// HMAC secret used to sign admin tokens
    pub token: String,

    /// OAuth client id for the redirect stage; falls back to the one in `auth`
    #[serde(default)]
    pub client_id: Option<String>,

    /// Static allow-list of admin emails; admin users are consulted when absent
    #[serde(default)]
    pub authorized_emails: Option<Vec<String>>,

    /// Public base URL of this service, ending in `/`
    #[serde(default)]
    pub public_url: Option<String>,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

impl AppConfig {
    /// Minimal configuration with the given signing secret
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            environment: Environment::default(),
            database_uri: None,
            auth: None,
            token: token.into(),
            client_id: None,
            authorized_emails: None,
            public_url: None,
            bind_addr: default_bind_addr(),
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable source
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let token = var("TOKEN").ok_or_else(|| ConfigError::MissingVar {
            name: "TOKEN".to_string(),
        })?;

        let mut config = Self::new(token);
        if let Some(env) = var("APP_ENV") {
            config.environment = env.parse()?;
        }
        config.database_uri = var("DATABASE_URI");
        config.auth = var("AUTH");
        config.client_id = var("CLIENT_ID");
        config.authorized_emails = var("AUTHORIZED_EMAILS").map(|v| parse_email_list(&v));
        config.public_url = var("PUBLIC_URL").map(normalize_base_url);
        if let Some(addr) = var("BIND_ADDR") {
            config.bind_addr = addr;
        }

        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.public_url = config.public_url.map(normalize_base_url);
        Ok(config)
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_database_uri(mut self, uri: impl Into<String>) -> Self {
        self.database_uri = Some(uri.into());
        self
    }

    pub fn with_auth(mut self, uri: impl Into<String>) -> Self {
        self.auth = Some(uri.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_authorized_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authorized_emails = Some(emails.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = Some(normalize_base_url(url.into()));
        self
    }

    /// OAuth client credentials decoded from `auth`
    ///
    /// Absent or malformed credentials are reported as "Bad credentials".
    pub fn credentials(&self) -> Result<OAuthCredentials, ApiError> {
        let uri = self.auth.as_deref().ok_or_else(bad_credentials)?;
        OAuthCredentials::from_json_uri(uri)
    }

    /// Client id used to build the authorization redirect
    pub fn oauth_client_id(&self) -> Result<String, ApiError> {
        match &self.client_id {
            Some(id) => Ok(id.clone()),
            None => self.credentials().map(|c| c.client_id),
        }
    }

    /// Build the document store selected by `database_uri`
    pub fn document_store(&self) -> Result<Arc<dyn DocumentStore>, ConfigError> {
        let Some(uri) = &self.database_uri else {
            return Ok(Arc::new(InMemoryDocumentStore::new()));
        };

        let invalid = |message: String| ConfigError::InvalidValue {
            name: "DATABASE_URI".to_string(),
            message,
        };

        let (scheme, payload) = decode_json_uri(uri).map_err(|e| invalid(e.to_string()))?;
        if scheme != MEMORY_SCHEME {
            return Err(ConfigError::UnsupportedStore { scheme });
        }

        let seed: StoreSeed =
            serde_json::from_value(payload).map_err(|e| invalid(e.to_string()))?;
        Ok(Arc::new(InMemoryDocumentStore::from_seed(seed)))
    }
}

fn parse_email_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_base_url(url: String) -> String {
    if url.ends_with('/') { url } else { format!("{}/", url) }
}

//! Sources of the authorized-email allow-list

use crate::core::error::ApiError;
use crate::core::service::EntityService;
use crate::entities::User;
use async_trait::async_trait;

/// Read-only set of emails permitted to receive an admin token
#[async_trait]
pub trait EmailAllowList: Send + Sync {
    async fn authorized_emails(&self) -> Result<Vec<String>, ApiError>;

    async fn is_authorized(&self, email: &str) -> Result<bool, ApiError> {
        Ok(self.authorized_emails().await?.iter().any(|e| e == email))
    }
}

/// Fixed list of emails, typically from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticAllowList {
    emails: Vec<String>,
}

impl StaticAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            emails: emails.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl EmailAllowList for StaticAllowList {
    async fn authorized_emails(&self) -> Result<Vec<String>, ApiError> {
        Ok(self.emails.clone())
    }
}

/// Emails of stored users flagged `isAdmin`
#[derive(Clone)]
pub struct AdminUserAllowList {
    users: EntityService<User>,
}

impl AdminUserAllowList {
    pub fn new(users: EntityService<User>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl EmailAllowList for AdminUserAllowList {
    async fn authorized_emails(&self) -> Result<Vec<String>, ApiError> {
        match self.users.list_where("isAdmin", true).await {
            Ok(admins) => Ok(admins.into_iter().map(|u| u.email).collect()),
            Err(ApiError::CollectionNotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

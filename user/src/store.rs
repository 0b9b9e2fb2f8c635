//! Persistence seams used by the identity resolver.

use async_trait::async_trait;
use authz::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::types::AuthenticatedUser;
use crate::error::Result;

/// A tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for a user being provisioned.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub account_id: String,
    /// Random secret; only its digest is stored
    pub credential: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Case-sensitive lookup among non-archived users.
    async fn find_active_by_email(&self, email: &str) -> Result<Option<AuthenticatedUser>>;

    async fn find_active_by_id(&self, id: &str) -> Result<Option<AuthenticatedUser>>;

    /// Fails with [`crate::UserError::DuplicateEmail`] when an active user
    /// with the same email exists.
    async fn create_user(&self, user: NewUser) -> Result<AuthenticatedUser>;

    async fn update_role(&self, id: &str, role: Role) -> Result<AuthenticatedUser>;

    async fn update_names(
        &self,
        id: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<AuthenticatedUser>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Returns the account called `name`, creating it on first use.
    async fn get_or_create_default_account(&self, name: &str) -> Result<Account>;
}

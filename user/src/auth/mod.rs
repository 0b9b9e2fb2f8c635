//! Authentication for DocSign
//!
//! This module provides:
//! - Parsing of the trusted proxy headers into a [`RemoteIdentityAssertion`]
//! - An axum-login backend that signs in users resolved from those headers
//! - Session configuration

pub mod remote;
pub mod session;
pub mod types;

use async_trait::async_trait;
use axum_login::{AuthnBackend, UserId};
use std::sync::Arc;
use tracing::{debug, error, info};

pub use remote::RemoteIdentityAssertion;
pub use session::SessionConfig;
pub use types::AuthenticatedUser;

use crate::{
    error::{Result, UserError},
    resolver::{IdentityResolver, Resolution},
    store::UserStore,
};

/// Authentication backend for axum-login
#[derive(Clone)]
pub struct AuthBackend {
    resolver: IdentityResolver,
    users: Arc<dyn UserStore>,
}

impl AuthBackend {
    pub fn new(resolver: IdentityResolver, users: Arc<dyn UserStore>) -> Self {
        Self { resolver, users }
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }
}

#[async_trait]
impl AuthnBackend for AuthBackend {
    type User = AuthenticatedUser;
    type Credentials = RemoteIdentityAssertion;
    type Error = UserError;

    /// Resolves the asserted identity. Callers only reach this when no
    /// session user exists, so the assertion is treated as unauthenticated.
    async fn authenticate(&self, creds: Self::Credentials) -> Result<Option<Self::User>> {
        match self.resolver.resolve(&creds, false).await {
            Ok(Resolution::Resolved(resolved)) => {
                info!(
                    "User {} authenticated via remote headers (created: {})",
                    resolved.user.id, resolved.created
                );
                Ok(Some(resolved.user))
            }
            Ok(Resolution::NoOp(reason)) => {
                debug!("Remote authentication skipped: {:?}", reason);
                Ok(None)
            }
            Err(e) => {
                error!("Remote authentication error: {}", e);
                Err(e)
            }
        }
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>> {
        debug!("Fetching user with ID: {}", user_id);
        self.users.find_active_by_id(user_id).await
    }
}

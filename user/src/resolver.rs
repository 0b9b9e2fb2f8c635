//! Turns a trusted-header assertion into a signed-in user.
//!
//! The resolver looks the caller up by email, provisions a new user when
//! allowed to, then keeps the stored names and role in step with what the
//! proxy asserts on this request.

use std::sync::Arc;

use authz::Role;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::remote::{parse_display_name, DisplayName, RemoteIdentityAssertion};
use crate::auth::types::AuthenticatedUser;
use crate::config::RemoteUserConfig;
use crate::error::{Result, UserError};
use crate::store::{AccountStore, NewUser, UserStore};

/// Role given to provisioned users until a group says otherwise.
pub const DEFAULT_ROLE: Role = Role::Member;

const CREDENTIAL_BYTES: usize = 32;

/// Why the resolver left the request alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    AlreadyAuthenticated,
    MissingEmail,
    /// No active user has this email and auto-provisioning is off
    UnknownUser,
}

#[derive(Debug, Clone)]
pub struct ResolvedUser {
    pub user: AuthenticatedUser,
    /// This request inserted the user row
    pub created: bool,
    pub names_updated: bool,
    pub role_updated: bool,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    NoOp(NoOpReason),
    Resolved(ResolvedUser),
}

impl Resolution {
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Resolution::Resolved(resolved) => Some(&resolved.user),
            Resolution::NoOp(_) => None,
        }
    }

    pub fn into_user(self) -> Option<AuthenticatedUser> {
        match self {
            Resolution::Resolved(resolved) => Some(resolved.user),
            Resolution::NoOp(_) => None,
        }
    }
}

/// Resolves remote identity assertions against user and account storage.
#[derive(Clone)]
pub struct IdentityResolver {
    config: Arc<RemoteUserConfig>,
    users: Arc<dyn UserStore>,
    accounts: Arc<dyn AccountStore>,
    // Serializes default-account get-or-create within this process.
    account_lock: Arc<Mutex<()>>,
}

impl IdentityResolver {
    pub fn new(
        config: RemoteUserConfig,
        users: Arc<dyn UserStore>,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            users,
            accounts,
            account_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn config(&self) -> &RemoteUserConfig {
        &self.config
    }

    /// Resolves `assertion` to a user.
    ///
    /// Missing or ambiguous data never fails: it yields a [`Resolution::NoOp`]
    /// or leaves the stored field unchanged. Only storage failures are errors.
    pub async fn resolve(
        &self,
        assertion: &RemoteIdentityAssertion,
        already_authenticated: bool,
    ) -> Result<Resolution> {
        if already_authenticated {
            return Ok(Resolution::NoOp(NoOpReason::AlreadyAuthenticated));
        }

        let Some(email) = assertion.normalized_email() else {
            return Ok(Resolution::NoOp(NoOpReason::MissingEmail));
        };

        let display_name = assertion
            .display_name
            .as_deref()
            .and_then(parse_display_name);

        let (mut user, created) = match self.users.find_active_by_email(email).await? {
            Some(user) => (user, false),
            None if self.config.auto_create_users => {
                self.provision(email, display_name.as_ref()).await?
            }
            None => {
                debug!("No active user for remote identity and auto-create is off");
                return Ok(Resolution::NoOp(NoOpReason::UnknownUser));
            }
        };

        let mut names_updated = false;
        if let Some(name) = &display_name {
            let unchanged = user.first_name.as_deref() == Some(name.first_name.as_str())
                && user.last_name.as_deref() == Some(name.last_name.as_str());
            if !unchanged {
                user = self
                    .users
                    .update_names(&user.id, &name.first_name, &name.last_name)
                    .await?;
                names_updated = true;
                debug!("Updated names for user {}", user.id);
            }
        }

        let mut role_updated = false;
        if let Some(role) = self.config.group_roles.role_for_groups(&assertion.groups) {
            if user.role() != Some(role) {
                let previous = user.role.clone();
                user = self.users.update_role(&user.id, role).await?;
                role_updated = true;
                info!(
                    "Role for user {} changed from {} to {} by group assertion",
                    user.id, previous, role
                );
            }
        }

        Ok(Resolution::Resolved(ResolvedUser {
            user,
            created,
            names_updated,
            role_updated,
        }))
    }

    /// Creates the user, or returns the row a concurrent request created.
    async fn provision(
        &self,
        email: &str,
        display_name: Option<&DisplayName>,
    ) -> Result<(AuthenticatedUser, bool)> {
        let account = {
            let _guard = self.account_lock.lock().await;
            self.accounts
                .get_or_create_default_account(&self.config.default_account_name)
                .await?
        };

        let new_user = NewUser {
            email: email.to_string(),
            first_name: display_name.map(|n| n.first_name.clone()),
            last_name: display_name.map(|n| n.last_name.clone()),
            role: DEFAULT_ROLE,
            account_id: account.id,
            credential: generate_credential(),
        };

        match self.users.create_user(new_user).await {
            Ok(user) => {
                info!(
                    "Provisioned user {} in account {} from remote identity",
                    user.id, user.account_id
                );
                Ok((user, true))
            }
            Err(UserError::DuplicateEmail(_)) => {
                warn!("Lost provisioning race, re-reading existing user");
                let existing = self
                    .users
                    .find_active_by_email(email)
                    .await?
                    .ok_or_else(|| UserError::UserNotFound(email.to_string()))?;
                Ok((existing, false))
            }
            Err(e) => Err(e),
        }
    }
}

/// An unguessable secret for users who only ever sign in through the proxy.
pub fn generate_credential() -> String {
    let mut bytes = [0u8; CREDENTIAL_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

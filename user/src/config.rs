//! Configuration for trusted-header authentication.
//!
//! Loaded once at startup and passed to the resolver. Nothing here is read
//! from the environment per request.

use std::collections::HashMap;
use std::env;

use authz::Role;
use tracing::{debug, info};

use crate::error::{Result, UserError};

/// Binds external group tokens to roles.
///
/// There is one slot per role, kept in the order admin, editor, viewer,
/// member, agent. Lookups go by token, so slot order only matters for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRoleMapping {
    slots: Vec<(String, Role)>,
}

impl GroupRoleMapping {
    /// Builds a mapping from `(token, role)` slots.
    ///
    /// Fails when a token is blank or bound to more than one role.
    pub fn new(slots: Vec<(String, Role)>) -> Result<Self> {
        let mut seen: HashMap<&str, Role> = HashMap::new();
        for (token, role) in &slots {
            if token.trim().is_empty() {
                return Err(UserError::Configuration(format!(
                    "Group token for role '{}' is empty",
                    role
                )));
            }
            if let Some(previous) = seen.insert(token.as_str(), *role) {
                return Err(UserError::Configuration(format!(
                    "Group token '{}' is bound to both '{}' and '{}'",
                    token, previous, role
                )));
            }
        }
        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[(String, Role)] {
        &self.slots
    }

    pub fn role_for_token(&self, token: &str) -> Option<Role> {
        self.slots
            .iter()
            .find(|(slot, _)| slot == token)
            .map(|(_, role)| *role)
    }

    /// The role of the first group, in the order given, that has a slot.
    pub fn role_for_groups<S: AsRef<str>>(&self, groups: &[S]) -> Option<Role> {
        groups
            .iter()
            .find_map(|group| self.role_for_token(group.as_ref()))
    }
}

impl Default for GroupRoleMapping {
    fn default() -> Self {
        Self {
            slots: Role::ALL
                .iter()
                .map(|role| (role.default_group_token(), *role))
                .collect(),
        }
    }
}

/// Settings for resolving users from trusted headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUserConfig {
    /// Create unknown users on first sight
    pub auto_create_users: bool,
    pub group_roles: GroupRoleMapping,
    /// Name of the account new users are attached to
    pub default_account_name: String,
}

impl Default for RemoteUserConfig {
    fn default() -> Self {
        Self {
            auto_create_users: false,
            group_roles: GroupRoleMapping::default(),
            default_account_name: "Default Account".to_string(),
        }
    }
}

impl RemoteUserConfig {
    /// Load configuration from the environment, reading `.env` first.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// - `AUTOCREATE_USERS`: `true` (any case) enables auto-provisioning
    /// - `GROUP_ADMIN`, `GROUP_EDITOR`, `GROUP_VIEWER`, `GROUP_MEMBER`,
    ///   `GROUP_AGENT`: group tokens, defaulting to `group-<role>`
    /// - `DEFAULT_ACCOUNT_NAME`: account used for new users
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let auto_create_users = lookup("AUTOCREATE_USERS")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.auto_create_users);

        let slots = Role::ALL
            .iter()
            .map(|role| {
                let var = group_variable(*role);
                let token = lookup(&var).unwrap_or_else(|| role.default_group_token());
                debug!("Group slot {} -> {}", var, token);
                (token, *role)
            })
            .collect();
        let group_roles = GroupRoleMapping::new(slots)?;

        let default_account_name = lookup("DEFAULT_ACCOUNT_NAME")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.default_account_name);

        info!(
            "Remote user authentication configured (auto-create: {})",
            auto_create_users
        );

        Ok(Self {
            auto_create_users,
            group_roles,
            default_account_name,
        })
    }
}

/// The environment variable holding the group token for `role`.
pub fn group_variable(role: Role) -> String {
    format!("GROUP_{}", role.as_str().to_ascii_uppercase())
}

//! The role catalog.
//!
//! Roles are a closed vocabulary. Each role's capabilities are declared
//! independently in [`crate::builder`]; there is no inheritance between them.
//! In decreasing order of trust: admin, editor, member, agent, viewer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AuthzError;

/// A user's role inside an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access to everything.
    Admin,
    /// Manages documents and folders, no account administration.
    Editor,
    /// Reads account documents and manages their own submissions.
    ///
    /// Auto-provisioned users start out as members.
    #[default]
    Member,
    /// Sends signature requests from existing templates.
    Agent,
    /// Read-only access to documents.
    Viewer,
}

impl Role {
    /// Every role, in the order their group slots are configured.
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Editor,
        Role::Viewer,
        Role::Member,
        Role::Agent,
    ];

    /// The identifier stored in the database and used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Member => "member",
            Role::Agent => "agent",
            Role::Viewer => "viewer",
        }
    }

    /// The group token that maps to this role when none is configured.
    pub fn default_group_token(&self) -> String {
        format!("group-{}", self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "member" => Ok(Role::Member),
            "agent" => Ok(Role::Agent),
            "viewer" => Ok(Role::Viewer),
            other => Err(AuthzError::UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_identifier() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert_eq!(
            "superadmin".parse::<Role>(),
            Err(AuthzError::UnknownRole("superadmin".to_string()))
        );
        // Identifiers are case sensitive, as stored.
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_default_group_tokens() {
        assert_eq!(Role::Admin.default_group_token(), "group-admin");
        assert_eq!(Role::Agent.default_group_token(), "group-agent");
    }

    #[test]
    fn test_default_role_is_member() {
        assert_eq!(Role::default(), Role::Member);
    }

    #[test]
    fn test_serde_uses_identifier() {
        assert_eq!(serde_json::to_string(&Role::Editor).unwrap(), "\"editor\"");
        let role: Role = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(role, Role::Viewer);
    }
}

//! Authentication types

use authz::types::Actor;
use authz::Role;
use axum_login::AuthUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user row as seen by the rest of the application
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Stored role identifier. May name a role outside the catalog.
    pub role: String,
    pub account_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl AuthenticatedUser {
    /// The catalog role, or `None` when the stored value is not one.
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    /// The policy actor for this user.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.account_id.clone(), self.role())
    }

    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }
}

impl AuthUser for AuthenticatedUser {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }

    fn session_auth_hash(&self) -> &[u8] {
        // The id is stable for the lifetime of the row.
        self.id.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            id: "u1".to_string(),
            email: "ada@example.com".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            role: role.to_string(),
            account_id: "acct".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            archived_at: None,
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(user("editor").role(), Some(Role::Editor));
        assert_eq!(user("superadmin").role(), None);
    }

    #[test]
    fn test_actor_carries_identity() {
        let actor = user("agent").actor();
        assert_eq!(actor.id, "u1");
        assert_eq!(actor.account_id, "acct");
        assert_eq!(actor.role, Some(Role::Agent));
    }

    #[test]
    fn test_full_name() {
        assert_eq!(user("member").full_name().as_deref(), Some("Ada Lovelace"));
        let mut anonymous = user("member");
        anonymous.first_name = None;
        anonymous.last_name = None;
        assert_eq!(anonymous.full_name(), None);
    }
}

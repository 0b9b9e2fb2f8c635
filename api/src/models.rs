use authz::{AccessRule, Effect};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use user::AuthenticatedUser;
use utoipa::{IntoParams, ToSchema};

/// A user as returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Stored role identifier
    pub role: String,
    pub account_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AuthenticatedUser> for UserResponse {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            account_id: user.account_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Query for a permission check.
///
/// Without any instance attribute the check is class-level.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PermissionCheckParams {
    pub action: String,
    pub resource: String,
    pub id: Option<String>,
    pub account_id: Option<String>,
    pub author_id: Option<String>,
    pub user_id: Option<String>,
}

impl PermissionCheckParams {
    pub fn is_instance_check(&self) -> bool {
        self.id.is_some()
            || self.account_id.is_some()
            || self.author_id.is_some()
            || self.user_id.is_some()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PermissionCheckResponse {
    pub action: String,
    pub resource: String,
    pub allowed: bool,
    /// The rule that decided the check, if any matched
    pub decided_by: Option<String>,
}

/// One row of a rule table
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RuleView {
    pub position: usize,
    pub effect: String,
    pub action: String,
    pub target: String,
    pub scoped: bool,
    pub description: String,
}

impl RuleView {
    pub fn new(position: usize, rule: &AccessRule) -> Self {
        Self {
            position,
            effect: match rule.effect {
                Effect::Grant => "grant".to_string(),
                Effect::Revoke => "revoke".to_string(),
            },
            action: rule.action.to_string(),
            target: rule.target.to_string(),
            scoped: rule.is_scoped(),
            description: rule.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RuleTableResponse {
    pub user_id: String,
    pub role: Option<String>,
    /// Rules in declaration order; evaluation scans from the end
    pub rules: Vec<RuleView>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub message: String,
}

/// Generic success response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

//! Error types for the authorization system.
//!
//! # Security Note
//! Denial is never an error: [`crate::AuthzEngine::can`] answers with a plain
//! `bool`. The variants below only cover names that arrive as strings (from
//! configuration, the database or the CLI) and fail to parse into the closed
//! vocabulary of roles, actions and resource kinds.

use thiserror::Error;

/// Errors that can occur while turning external names into authorization types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// A role identifier that is not part of the role catalog.
    ///
    /// Stored roles outside the catalog (for example an out-of-band super
    /// admin) are treated as "no role" by the policy builder rather than
    /// surfacing this error per request.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// An action name that the policy engine does not know about.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// A resource type name that the policy engine does not know about.
    ///
    /// Callers evaluating permissions by name must deny on this error.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),
}

/// Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_input() {
        assert_eq!(
            AuthzError::UnknownRole("superadmin".to_string()).to_string(),
            "Unknown role: superadmin"
        );
        assert_eq!(
            AuthzError::UnknownResource("widget".to_string()).to_string(),
            "Unknown resource type: widget"
        );
    }
}

//! Session cookie settings

use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

use crate::error::{Result, UserError};

const DEFAULT_TIMEOUT_SECONDS: i64 = 86400;

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Session cookie name
    pub cookie_name: String,
    /// Inactivity timeout in seconds
    pub timeout_seconds: i64,
    /// Whether to use secure cookies (HTTPS only)
    pub secure: bool,
    /// HTTP only cookie (not accessible via JavaScript)
    pub http_only: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "docsign_session".to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            secure: false,
            http_only: true,
        }
    }
}

impl SessionConfig {
    /// Load session configuration from `SESSION_TIMEOUT_SECONDS` and
    /// `SESSION_SECURE_COOKIES`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("SESSION_TIMEOUT_SECONDS") {
            let timeout: i64 = raw.trim().parse().map_err(|e| {
                UserError::Configuration(format!("Invalid SESSION_TIMEOUT_SECONDS '{}': {}", raw, e))
            })?;
            if timeout <= 0 {
                return Err(UserError::Configuration(
                    "SESSION_TIMEOUT_SECONDS must be positive".to_string(),
                ));
            }
            config.timeout_seconds = timeout;
        }

        if let Some(raw) = lookup("SESSION_SECURE_COOKIES") {
            config.secure = raw.trim().eq_ignore_ascii_case("true");
        }
        if !config.secure {
            warn!("Session cookies are not marked secure; serve behind HTTPS in production");
        }

        Ok(config)
    }
}

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod resolver;
pub mod store;

use std::sync::Arc;
use tracing::info;

use auth::AuthBackend;
use database::UserDatabase;
use resolver::IdentityResolver;

/// User management: storage, identity resolution and the login backend
pub struct UserManager {
    database: Arc<UserDatabase>,
    resolver: IdentityResolver,
    auth_backend: AuthBackend,
    session_config: SessionConfig,
}

impl UserManager {
    /// Create a new user manager with the provided configuration
    pub async fn new(
        db_config: database::UserDatabaseConfig,
        remote_config: RemoteUserConfig,
        session_config: SessionConfig,
    ) -> error::Result<Self> {
        info!("Initializing user management system");

        let database = Arc::new(UserDatabase::new(db_config).await?);
        let resolver = IdentityResolver::new(remote_config, database.clone(), database.clone());
        let auth_backend = AuthBackend::new(resolver.clone(), database.clone());

        info!("User management system initialized successfully");

        Ok(Self {
            database,
            resolver,
            auth_backend,
            session_config,
        })
    }

    /// Create a user manager from environment configuration
    pub async fn from_env(db_config: database::UserDatabaseConfig) -> error::Result<Self> {
        Self::new(
            db_config,
            RemoteUserConfig::from_env()?,
            SessionConfig::from_env()?,
        )
        .await
    }

    pub fn database(&self) -> &UserDatabase {
        &self.database
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    pub fn auth_backend(&self) -> &AuthBackend {
        &self.auth_backend
    }

    pub fn session_config(&self) -> &SessionConfig {
        &self.session_config
    }

    /// Verify system integrity
    pub async fn verify_integrity(&self) -> error::Result<bool> {
        self.database.verify_integrity().await
    }
}

// Re-export commonly used types
pub use auth::remote::{parse_display_name, DisplayName};
pub use auth::{AuthenticatedUser, RemoteIdentityAssertion, SessionConfig};
pub use config::{GroupRoleMapping, RemoteUserConfig};
pub use database::UserDatabaseConfig;
pub use error::{Result as UserResult, UserError};
pub use resolver::{NoOpReason, Resolution, ResolvedUser};
pub use store::{Account, AccountStore, NewUser, UserStore};

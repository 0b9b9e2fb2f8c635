mod logging;

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use user::{RemoteUserConfig, SessionConfig, UserDatabaseConfig, UserManager};

/// Environment paths configuration
#[derive(Debug, Clone, Serialize)]
pub struct EnvPaths {
    pub data_path: PathBuf,
}

impl EnvPaths {
    /// Load paths from environment variables
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let project_root = std::env::current_dir()?;
        let data_path = std::env::var("DATA_PATH").unwrap_or_else(|_| "./data".to_string());

        Ok(Self {
            data_path: resolve_path(&project_root, &data_path),
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_path.join("docsign.db")
    }

    pub fn logs_path(&self) -> PathBuf {
        self.data_path.join("logs")
    }
}

/// Resolve a relative path against `root`.
fn resolve_path(root: &Path, path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("./") {
        root.join(stripped)
    } else if Path::new(path).is_absolute() {
        PathBuf::from(path)
    } else {
        root.join(path)
    }
}

/// Load configuration, open storage and serve the API until shutdown.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let env_paths = EnvPaths::from_env()?;
    let _guard = logging::init_logging(&env_paths)?;

    tracing::info!("=== DocSign starting up ===");
    tracing::info!("  Data path: {:?}", env_paths.data_path);

    // Group bindings are validated here so a bad mapping stops startup.
    let remote_config = RemoteUserConfig::from_env()?;
    let session_config = SessionConfig::from_env()?;
    for (token, role) in remote_config.group_roles.slots() {
        tracing::info!("  Group '{}' -> {}", token, role);
    }

    let db_config = UserDatabaseConfig {
        database_path: env_paths.database_path(),
        ..UserDatabaseConfig::default()
    };
    let user_manager = Arc::new(UserManager::new(db_config, remote_config, session_config).await?);

    let api_config = api::ApiConfig::from_env();
    tracing::info!("Starting API server on port {}", api_config.port);

    tokio::select! {
        result = api::start_server_with_config(user_manager, api_config) => {
            if let Err(e) = result {
                tracing::error!("API server error: {}", e);
                logging::log_shutdown();
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    logging::log_shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/srv/docsign");
        assert_eq!(resolve_path(root, "./data"), PathBuf::from("/srv/docsign/data"));
        assert_eq!(resolve_path(root, "data"), PathBuf::from("/srv/docsign/data"));
        assert_eq!(resolve_path(root, "/var/lib/docsign"), PathBuf::from("/var/lib/docsign"));
    }

    #[test]
    fn test_derived_paths() {
        let paths = EnvPaths {
            data_path: PathBuf::from("/tmp/data"),
        };
        assert_eq!(paths.database_path(), PathBuf::from("/tmp/data/docsign.db"));
        assert_eq!(paths.logs_path(), PathBuf::from("/tmp/data/logs"));
    }
}

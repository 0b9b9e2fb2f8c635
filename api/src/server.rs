use crate::{create_router, AppState};
use std::env;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use user::UserManager;

const DEFAULT_PORT: u16 = 3030;

/// API server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Port to listen on
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl ApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `API_PORT`, falling back to the default port.
    pub fn from_env() -> Self {
        match env::var("API_PORT") {
            Ok(raw) => match raw.trim().parse() {
                Ok(port) => Self { port },
                Err(_) => {
                    warn!("Invalid API_PORT '{}', using {}", raw, DEFAULT_PORT);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Start the API server with the given configuration
pub async fn start_server_with_config(
    user_manager: Arc<UserManager>,
    config: ApiConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState { user_manager };
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on {}", addr);
    info!(
        "Swagger UI available at http://localhost:{}/api/v1/swagger",
        config.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}

/// Start the API server with default configuration
pub async fn start_server(user_manager: Arc<UserManager>) -> Result<(), Box<dyn std::error::Error>> {
    start_server_with_config(user_manager, ApiConfig::default()).await
}

/// Start the API server in a background task
pub fn spawn_server(user_manager: Arc<UserManager>) -> JoinHandle<()> {
    spawn_server_with_config(user_manager, ApiConfig::default())
}

/// Start the API server in a background task with custom configuration
pub fn spawn_server_with_config(user_manager: Arc<UserManager>, config: ApiConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = start_server_with_config(user_manager, config).await {
            tracing::error!("API server error: {}", e);
        }
    })
}

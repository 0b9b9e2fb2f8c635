use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use axum_login::AuthManagerLayerBuilder;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error;
pub mod handlers;
pub mod middleware_hooks;
pub mod models;
pub mod server;


// Re-export server functions for convenience
pub use server::{
    spawn_server, spawn_server_with_config, start_server, start_server_with_config, ApiConfig,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_manager: Arc<user::UserManager>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::get_current_user,
        handlers::auth::logout,
        handlers::permissions::check_permission,
        handlers::permissions::list_rules,
        handlers::users::get_user,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::UserResponse,
            models::PermissionCheckResponse,
            models::RuleView,
            models::RuleTableResponse,
            models::HealthResponse,
            models::DatabaseHealth,
            models::SuccessResponse,
            error::ApiErrorResponse,
            error::ErrorDetail,
        )
    ),
    tags(
        (name = "auth", description = "Session endpoints"),
        (name = "permissions", description = "Permission checks for the signed-in user"),
        (name = "users", description = "User records"),
        (name = "health", description = "Health check endpoints"),
    ),
    info(
        title = "DocSign API",
        version = "1.0.0",
        description = "Access control API for DocSign",
    ),
)]
pub struct ApiDoc;

/// Create the main API router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let session_config = state.user_manager.session_config();
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(session_config.cookie_name.clone())
        .with_secure(session_config.secure)
        .with_http_only(session_config.http_only)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(
            session_config.timeout_seconds,
        )));
    let auth_layer =
        AuthManagerLayerBuilder::new(state.user_manager.auth_backend().clone(), session_layer)
            .build();

    let api_v1 = Router::new()
        .route("/auth/me", get(handlers::auth::get_current_user))
        .route("/auth/logout", post(handlers::auth::logout))
        .route(
            "/permissions/check",
            get(handlers::permissions::check_permission),
        )
        .route("/permissions/rules", get(handlers::permissions::list_rules))
        .route("/users/:id", get(handlers::users::get_user))
        .route("/health", get(handlers::health::health_check))
        // Header sign-in runs inside the session layer
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middleware_hooks::remote_user_middleware,
        ))
        .layer(auth_layer)
        .layer(middleware::from_fn(middleware_hooks::request_middleware))
        .layer(middleware::from_fn(middleware_hooks::response_middleware));

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(SwaggerUi::new("/api/v1/swagger").url("/api/v1/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

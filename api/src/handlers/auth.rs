//! Session handlers

use axum::response::Json;
use axum_login::AuthSession;
use tracing::{error, info};
use user::auth::AuthBackend;

use crate::{
    error::{ApiError, ApiErrorResponse, ApiResult},
    middleware_hooks::CurrentUser,
    models::{SuccessResponse, UserResponse},
};

/// Get current user info
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "The signed-in user", body = UserResponse),
        (status = 401, description = "Not signed in", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn get_current_user(CurrentUser(user): CurrentUser) -> ApiResult<Json<UserResponse>> {
    Ok(Json(user.into()))
}

/// End the session
///
/// Requests that still carry trusted headers will sign in again.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Session ended", body = SuccessResponse)
    ),
    tag = "auth"
)]
pub async fn logout(
    mut auth_session: AuthSession<AuthBackend>,
) -> ApiResult<Json<SuccessResponse>> {
    let user = auth_session.logout().await.map_err(|e| {
        error!("Failed to end session: {}", e);
        ApiError::InternalError("Session error".to_string())
    })?;

    if let Some(user) = user {
        info!("User {} logged out", user.id);
    }

    Ok(Json(SuccessResponse {
        success: true,
        message: "Logged out successfully".to_string(),
    }))
}

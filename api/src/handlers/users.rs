use authz::types::{Action, Resource, ResourceKind};
use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::warn;
use user::UserStore;

use crate::{
    error::{ApiError, ApiErrorResponse, ApiResult},
    middleware_hooks::CurrentUser,
    models::UserResponse,
    AppState,
};

/// Read a user record
///
/// Every user may read their own record and admins may read any. Users
/// without a catalog role may also read colleagues in their account.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Not signed in", body = ApiErrorResponse),
        (status = 403, description = "Not allowed to read this user", body = ApiErrorResponse),
        (status = 404, description = "User not found", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let target = state
        .user_manager
        .database()
        .find_active_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {}", id)))?;

    let resource = Resource::user(&target.id, &target.account_id);
    if current.engine().cannot(Action::Read, &resource) {
        warn!("User {} denied read of user {}", current.0.id, target.id);
        return Err(ApiError::Forbidden {
            action: Action::Read,
            resource: ResourceKind::User,
        });
    }

    Ok(Json(target.into()))
}

//! Permission introspection for the signed-in user

use authz::types::{Action, Resource, ResourceKind, Subject};
use axum::{extract::Query, response::Json};
use tracing::debug;

use crate::{
    error::{ApiErrorResponse, ApiResult},
    middleware_hooks::CurrentUser,
    models::{PermissionCheckParams, PermissionCheckResponse, RuleTableResponse, RuleView},
};

/// Check whether the signed-in user may perform an action
///
/// Unknown action or resource names are reported as not allowed.
#[utoipa::path(
    get,
    path = "/api/v1/permissions/check",
    params(PermissionCheckParams),
    responses(
        (status = 200, description = "Verdict", body = PermissionCheckResponse),
        (status = 401, description = "Not signed in", body = ApiErrorResponse)
    ),
    tag = "permissions"
)]
pub async fn check_permission(
    current: CurrentUser,
    Query(params): Query<PermissionCheckParams>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    let engine = current.engine();

    let parsed = params
        .action
        .parse::<Action>()
        .ok()
        .zip(params.resource.parse::<ResourceKind>().ok());

    let (allowed, decided_by) = match parsed {
        Some((action, kind)) => {
            let instance = params.is_instance_check().then(|| Resource {
                kind,
                id: params.id.clone(),
                account_id: params.account_id.clone(),
                author_id: params.author_id.clone(),
                user_id: params.user_id.clone(),
            });
            let subject = match &instance {
                Some(resource) => Subject::Instance(resource),
                None => Subject::Kind(kind),
            };
            let allowed = engine.can(action, subject);
            let decided_by = engine
                .decisive_rule(action, subject)
                .map(|rule| rule.to_string());
            (allowed, decided_by)
        }
        None => {
            debug!(
                "Permission check with unknown names: {} {}",
                params.action, params.resource
            );
            (false, None)
        }
    };

    Ok(Json(PermissionCheckResponse {
        action: params.action,
        resource: params.resource,
        allowed,
        decided_by,
    }))
}

/// The signed-in user's rule table in declaration order
#[utoipa::path(
    get,
    path = "/api/v1/permissions/rules",
    responses(
        (status = 200, description = "Rule table", body = RuleTableResponse),
        (status = 401, description = "Not signed in", body = ApiErrorResponse)
    ),
    tag = "permissions"
)]
pub async fn list_rules(current: CurrentUser) -> ApiResult<Json<RuleTableResponse>> {
    let engine = current.engine();
    let rules = engine
        .rules()
        .iter()
        .enumerate()
        .map(|(position, rule)| RuleView::new(position, rule))
        .collect();

    Ok(Json(RuleTableResponse {
        user_id: current.0.id.clone(),
        role: current.0.role().map(|role| role.to_string()),
        rules,
    }))
}

use authz::AuthzEngine;
use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use axum_login::AuthSession;
use std::time::Instant;
use tracing::{debug, info, warn};
use user::{auth::AuthBackend, AuthenticatedUser, RemoteIdentityAssertion, Resolution};

use crate::{error::ApiError, AppState};

/// The signed-in user for this request.
///
/// Set by [`remote_user_middleware`]. Extracting it from a request without a
/// user rejects with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

impl CurrentUser {
    /// A policy engine for this user.
    pub fn engine(&self) -> AuthzEngine {
        AuthzEngine::for_actor(self.0.actor())
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}

/// Trusted-header authentication
///
/// An existing session always wins. Otherwise the `X-Remote-*` headers are
/// resolved to a user, who is then logged into a new session. When nothing
/// resolves, the request continues unauthenticated and protected handlers
/// reject it.
pub async fn remote_user_middleware(
    State(state): State<AppState>,
    mut auth_session: AuthSession<AuthBackend>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let already_authenticated = auth_session.user.is_some();
    let assertion = RemoteIdentityAssertion::from_headers(request.headers());

    let resolution = state
        .user_manager
        .resolver()
        .resolve(&assertion, already_authenticated)
        .await?;

    let user = match resolution {
        Resolution::Resolved(resolved) => {
            auth_session.login(&resolved.user).await.map_err(|e| {
                ApiError::InternalError(format!("Failed to establish session: {}", e))
            })?;
            debug!("REMOTE USER: Signed in user {}", resolved.user.id);
            Some(resolved.user)
        }
        Resolution::NoOp(reason) => {
            debug!("REMOTE USER: No header sign-in ({:?})", reason);
            auth_session.user.clone()
        }
    };

    if let Some(user) = user {
        request.extensions_mut().insert(CurrentUser(user));
    }

    Ok(next.run(request).await)
}

/// Request processing middleware hook
pub async fn request_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    info!("REQUEST: {} {}", method, uri);

    let response = next.run(request).await;

    let status = response.status();
    if status.is_client_error() {
        warn!("REQUEST: {} {} rejected with {}", method, uri, status);
    }
    debug!("REQUEST: {} {} processed in {:?}", method, uri, start.elapsed());

    response
}

/// Response processing middleware hook
pub async fn response_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    response.headers_mut().insert(
        "X-DocSign-Version",
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );

    response
}

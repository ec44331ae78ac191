/// Route-level role and permission checks
///
/// Runs after JWT authentication. The caller's role is re-read from the
/// database and checked against a [`RoutePolicy`]; on success the current
/// role replaces the token's role claim in the request's `AuthContext`.
///
/// # Example
///
/// ```no_run
/// use axum::{extract::{Request, State}, middleware::{self, Next}, routing::get, Router};
/// use todoapp_api::app::{AppState, LIST_USERS_POLICY};
/// use todoapp_api::middleware::authorize::authorize_request;
///
/// # fn example(state: AppState) -> Router<AppState> {
/// Router::new().route(
///     "/users",
///     get(|| async { "[]" }).route_layer(middleware::from_fn_with_state(
///         state,
///         |State(state): State<AppState>, req: Request, next: Next| {
///             authorize_request(state, LIST_USERS_POLICY, req, next)
///         },
///     )),
/// )
/// # }
/// ```

use axum::{extract::Request, middleware::Next, response::Response};
use todoapp_shared::auth::{
    authorization::{authorize, RoutePolicy},
    middleware::AuthContext,
};

use crate::{app::AppState, error::ApiError};

/// Enforces `policy` for the authenticated caller
///
/// # Errors
///
/// - 401 if no `AuthContext` is present or the user no longer exists
/// - 403 "Access denied: Role not permitted" if the role is not allowed
/// - 403 "Permission denied" if the role lacks the permission
pub async fn authorize_request(
    state: AppState,
    policy: RoutePolicy,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .copied()
        .ok_or_else(|| ApiError::Unauthorized("Missing credentials".to_string()))?;

    let role = authorize(&state.db, &auth, &policy).await.map_err(|e| {
        tracing::warn!(
            user_id = %auth.user_id,
            path = %req.uri().path(),
            error = %e,
            "Authorization failed"
        );
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(AuthContext::new(auth.user_id, role));

    Ok(next.run(req).await)
}

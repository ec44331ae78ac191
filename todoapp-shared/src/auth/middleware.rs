/// Authentication middleware for Axum
///
/// Extracts the bearer token from the `Authorization` header, validates it as
/// an access token and adds an [`AuthContext`] to the request extensions.
///
/// # Request Extensions
///
/// After successful authentication the middleware adds:
/// - `AuthContext`: the user ID and the role claim of the token
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware, Extension};
/// use todoapp_shared::auth::middleware::{create_jwt_middleware, AuthContext};
///
/// async fn protected_handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(protected_handler))
///     .layer(middleware::from_fn(create_jwt_middleware("your-jwt-secret".to_string())));
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

use super::jwt::{validate_access_token, Claims, JwtError};
use crate::models::role::RoleName;

/// Authentication context added to request extensions
///
/// The role here is the claim carried by the token. Route policies that
/// need the current role re-read it from the database
/// (see [`crate::auth::authorization::authorize`]).
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use todoapp_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}, Role: {}", auth.user_id, auth.role)
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Role claim of the token
    pub role: RoleName,
}

impl AuthContext {
    /// Creates an auth context
    pub fn new(user_id: Uuid, role: RoleName) -> Self {
        Self { user_id, role }
    }

    /// Creates auth context from validated JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self::new(claims.sub, claims.role)
    }

    /// Whether the caller carries the admin override
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header present but not a bearer token
    #[error("{0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),
}

impl AuthError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "unauthorized",
            AuthError::InvalidFormat(_) => "bad_request",
            AuthError::InvalidToken(_) => "unauthorized",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
        });

        (self.status_code(), Json(body)).into_response()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
///
/// # Errors
///
/// - `AuthError::MissingCredentials` if the header is absent or not UTF-8
/// - `AuthError::InvalidFormat` if the scheme is not `Bearer` or the token is empty
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Expected Bearer token".to_string()));
    }

    Ok(token)
}

/// Authenticates a request from its headers
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use todoapp_shared::auth::jwt::{create_token, Claims, TokenType};
/// use todoapp_shared::auth::middleware::authenticate;
/// use todoapp_shared::models::role::RoleName;
/// use uuid::Uuid;
///
/// let claims = Claims::new(Uuid::new_v4(), RoleName::User, TokenType::Access);
/// let token = create_token(&claims, "secret").unwrap();
///
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     header::AUTHORIZATION,
///     HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
/// );
///
/// let auth = authenticate(&headers, "secret").unwrap();
/// assert_eq!(auth.user_id, claims.sub);
/// ```
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = extract_bearer_token(headers)?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken("Invalid token".to_string()),
    })?;

    Ok(AuthContext::from_claims(&claims))
}

/// JWT authentication middleware
///
/// # Errors
///
/// Returns 401 Unauthorized if the header is missing or the token is
/// invalid or expired, and 400 Bad Request if the header is not a bearer
/// token.
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_context = match authenticate(req.headers(), &secret) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::debug!(
                path = %req.uri().path(),
                error = %e,
                "Rejected unauthenticated request"
            );
            return Err(e);
        }
    };

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Creates a JWT authentication middleware closure
///
/// Captures the JWT secret and returns a function usable with
/// `axum::middleware::from_fn`.
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware};
/// use todoapp_shared::auth::middleware::create_jwt_middleware;
///
/// let app: Router = Router::new()
///     .route("/protected", get(|| async { "OK" }))
///     .layer(middleware::from_fn(create_jwt_middleware("secret".to_string())));
/// ```
pub fn create_jwt_middleware(
    secret: String,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, AuthError>> + Send>>
       + Clone {
    move |req, next| {
        let secret = secret.clone();
        Box::pin(jwt_auth_middleware(secret, req, next))
    }
}

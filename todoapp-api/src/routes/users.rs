/// User account endpoints
///
/// # Endpoints
///
/// - `POST /user/register` - Create an account (role `user`)
/// - `POST /user/login` - Exchange credentials for tokens
/// - `POST /user/refresh` - Exchange a refresh token for a new access token
/// - `GET  /user/me` - Current user's profile
/// - `GET  /user/users` - List accounts (admin, `users:read`)
/// - `PUT  /user/user/:id` - Update a profile (self or admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::{pagination, path_id, required, Pagination},
};
use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use todoapp_shared::{
    auth::{
        authorization::{check_user_update, verified_context},
        jwt::{self, Claims, TokenType},
        middleware::AuthContext,
        password,
    },
    models::{
        role::{Role, RoleName},
        user::{CreateUser, UpdateUser, User},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name
    pub name: Option<String>,

    /// Email address
    pub email: Option<String>,

    /// Plaintext password
    pub password: Option<String>,
}

/// Register request after presence checks
#[derive(Debug, Validate)]
struct NewAccount {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    name: String,

    #[validate(email(message = "Invalid email format"))]
    email: String,

    password: String,
}

/// Register response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Confirmation message
    pub message: String,

    /// ID of the new account
    pub user_id: Uuid,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: Option<String>,

    /// Password
    pub password: Option<String>,
}

/// Public view of an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Role name
    pub role: RoleName,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role(),
        }
    }
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Access token
    pub token: String,

    /// Refresh token (30d)
    pub refresh_token: String,

    /// The authenticated account
    pub user: UserSummary,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: Option<String>,
}

/// Refresh token response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token
    pub token: String,
}

/// Profile of the current user
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    /// Account summary
    #[serde(flatten)]
    pub user: UserSummary,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// Previous login
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Update request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: Option<String>,

    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New password
    pub password: Option<String>,
}

/// Generic confirmation body
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Confirmation message
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

fn weak_password(reason: String) -> ApiError {
    ApiError::ValidationError(vec![ValidationErrorDetail::new("password", reason)])
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /user/register
/// Content-Type: application/json
///
/// {
///   "name": "Jane Doe",
///   "email": "jane@example.com",
///   "password": "groceries42"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: a field is missing or blank
/// - `409 Conflict`: email already registered
/// - `422 Unprocessable Entity`: invalid email or weak password
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;

    let (name, email, password) = match (
        required(req.name),
        required(req.email),
        req.password.filter(|p| !p.is_empty()),
    ) {
        (Some(name), Some(email), Some(password)) => (name, email, password),
        _ => return Err(ApiError::BadRequest("All fields are required".to_string())),
    };

    let account = NewAccount {
        name,
        email: email.to_lowercase(),
        password,
    };
    account.validate()?;
    password::validate_password_strength(&account.password).map_err(weak_password)?;

    if User::email_exists(&state.db, &account.email).await? {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&account.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: account.name,
            email: account.email,
            password_hash,
            role: RoleName::DEFAULT,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id: user.id,
        }),
    ))
}

/// Log in with email and password
///
/// The access token carries the account's current role; its lifetime comes
/// from `JWT_ACCESS_TTL_HOURS`.
///
/// # Errors
///
/// - `400 Bad Request`: a field is missing
/// - `401 Unauthorized`: unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;

    let (email, password) = match (required(req.email), req.password.filter(|p| !p.is_empty())) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(ApiError::BadRequest("All fields are required".to_string())),
    };

    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let user = User::find_by_email(&state.db, &email).await?.ok_or_else(|| {
        tracing::debug!("Login attempt for unknown email");
        invalid()
    })?;

    if !password::verify_password(&password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(invalid());
    }

    let role = user.role();
    let access = Claims::with_expiration(user.id, role, TokenType::Access, state.access_ttl());
    let token = jwt::create_token(&access, state.jwt_secret())?;
    let refresh_token = jwt::create_token(
        &Claims::new(user.id, role, TokenType::Refresh),
        state.jwt_secret(),
    )?;

    User::update_last_login(&state.db, user.id).await?;

    tracing::info!(user_id = %user.id, role = %role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        refresh_token,
        user: UserSummary::from(&user),
    }))
}

/// Exchange a refresh token for a new access token
///
/// # Errors
///
/// - `400 Bad Request`: `refresh_token` missing
/// - `401 Unauthorized`: invalid or expired token, or the account is gone
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<RefreshResponse>> {
    let Json(req) = payload?;

    let refresh_token = required(req.refresh_token)
        .ok_or_else(|| ApiError::BadRequest("All fields are required".to_string()))?;

    let claims = jwt::validate_refresh_token(&refresh_token, state.jwt_secret())?;

    let role = Role::role_of_user(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    let token =
        jwt::refresh_access_token(&refresh_token, state.jwt_secret(), role, state.access_ttl())?;

    tracing::debug!(user_id = %claims.sub, "Access token refreshed");

    Ok(Json(RefreshResponse { token }))
}

/// Current user's profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        user: UserSummary::from(&user),
        created_at: user.created_at,
        last_login_at: user.last_login_at,
    }))
}

/// List accounts
///
/// Supports `?limit=&offset=`.
///
/// # Errors
///
/// - `404 Not Found`: no accounts on this page
pub async fn list_users(
    State(state): State<AppState>,
    query: Option<Query<Pagination>>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let (limit, offset) = pagination(query).bounds();

    let users = User::list(&state.db, limit, offset).await?;

    if users.is_empty() {
        return Err(ApiError::NotFound("No users found".to_string()));
    }

    Ok(Json(users.iter().map(UserSummary::from).collect()))
}

/// Update a user profile
///
/// # Errors
///
/// - `400 Bad Request`: no field given
/// - `403 Forbidden`: caller is neither the user nor an admin
/// - `404 Not Found`: no such user
/// - `409 Conflict`: email belongs to another account
/// - `422 Unprocessable Entity`: invalid email or weak password
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let user_id = path_id(path, "User not found")?;
    let auth = verified_context(&state.db, &auth).await?;
    check_user_update(&auth, user_id)?;

    let Json(req) = payload?;
    let req = UpdateUserRequest {
        name: required(req.name),
        email: required(req.email).map(|e| e.to_lowercase()),
        password: req.password.filter(|p| !p.is_empty()),
    };
    req.validate()?;

    if let Some(ref new_password) = req.password {
        password::validate_password_strength(new_password).map_err(weak_password)?;
    }

    let password_hash = req
        .password
        .as_deref()
        .map(password::hash_password)
        .transpose()?;

    let update = UpdateUser {
        name: req.name,
        email: req.email,
        password_hash,
    };

    if update.is_empty() {
        return Err(ApiError::BadRequest("Fields are required".to_string()));
    }

    if User::find_by_id(&state.db, user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    if let Some(ref email) = update.email {
        if let Some(existing) = User::find_by_email(&state.db, email).await? {
            if existing.id != user_id {
                return Err(ApiError::Conflict("Email already registered".to_string()));
            }
        }
    }

    User::update(&state.db, user_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user_id, updated_by = %auth.user_id, "User updated");

    Ok(MessageResponse::new("User updated successfully"))
}

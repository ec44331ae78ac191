/// Authorization helpers and permission checks
///
/// Two layers of access control are provided:
///
/// 1. **Route policies** ([`authorize`]): the caller's role is re-read from the
///    database and checked against the roles a route allows, then the
///    permissions granted to that role are checked for a named permission.
/// 2. **Resource checks** (`check_*`): pure ownership rules for todos and user
///    profiles. Admins override ownership; completed todos are read-only for
///    everyone else.
///
/// # Example
///
/// ```no_run
/// use todoapp_shared::auth::authorization::{authorize, check_edit, RoutePolicy};
/// use todoapp_shared::auth::middleware::AuthContext;
/// use todoapp_shared::models::role::{permissions, RoleName};
/// use todoapp_shared::models::todo::Todo;
/// use sqlx::PgPool;
///
/// async fn edit(pool: &PgPool, auth: AuthContext, todo: Todo) -> Result<(), Box<dyn std::error::Error>> {
///     let policy = RoutePolicy::new(&[RoleName::Admin, RoleName::User])
///         .with_permission(permissions::TODOS_WRITE);
///     authorize(pool, &auth, &policy).await?;
///
///     check_edit(&auth, &todo)?;
///     Ok(())
/// }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::role::{Role, RoleName};
use crate::models::todo::Todo;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller's role is not in the route's allowed set
    #[error("Access denied: Role not permitted")]
    RoleNotPermitted,

    /// Caller's role lacks the route's permission
    #[error("Permission denied")]
    PermissionDenied,

    /// Token subject no longer exists
    #[error("User not found")]
    UnknownUser,

    /// Resource missing, or not visible to the caller
    #[error("Todo not found")]
    NotFound,

    /// Completed todos may only be edited by admins
    #[error("Cannot update a completed todo")]
    CompletedImmutable,

    /// Caller may not act on this resource
    #[error("{0}")]
    Forbidden(String),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Roles and permission a route requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePolicy {
    /// Roles allowed on the route
    pub roles: &'static [RoleName],

    /// Permission the role must grant, if any
    pub permission: Option<&'static str>,
}

impl RoutePolicy {
    /// Policy allowing the given roles with no permission requirement
    pub const fn new(roles: &'static [RoleName]) -> Self {
        Self {
            roles,
            permission: None,
        }
    }

    /// Adds a required permission
    pub const fn with_permission(mut self, permission: &'static str) -> Self {
        self.permission = Some(permission);
        self
    }

    /// Whether `role` is in the allowed set
    pub fn allows_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }
}

/// Checks a caller against a route policy
///
/// The role is looked up in the database rather than trusted from the
/// token, so a role change takes effect on the next request.
///
/// # Errors
///
/// - `AuthzError::UnknownUser` if the user no longer exists
/// - `AuthzError::RoleNotPermitted` if the role is not allowed
/// - `AuthzError::PermissionDenied` if the role lacks the permission
pub async fn authorize(
    pool: &PgPool,
    auth: &AuthContext,
    policy: &RoutePolicy,
) -> Result<RoleName, AuthzError> {
    let role = Role::role_of_user(pool, auth.user_id)
        .await?
        .ok_or(AuthzError::UnknownUser)?;

    if !policy.allows_role(role) {
        tracing::warn!(
            user_id = %auth.user_id,
            role = %role,
            "Role not permitted on route"
        );
        return Err(AuthzError::RoleNotPermitted);
    }

    if let Some(required) = policy.permission {
        let granted = Role::permissions_of_user(pool, auth.user_id).await?;
        require_permission(&granted, required)?;
    }

    Ok(role)
}

/// Confirms an admin claim against the database
///
/// Ownership checks trust [`AuthContext::role`], which comes from the token.
/// A token can only grant more than the caller's stored role through an admin
/// claim, so only those are re-read; user claims are returned unchanged.
///
/// # Errors
///
/// - `AuthzError::UnknownUser` if an admin claim names a user that no longer exists
pub async fn verified_context(
    pool: &PgPool,
    auth: &AuthContext,
) -> Result<AuthContext, AuthzError> {
    if !auth.is_admin() {
        return Ok(*auth);
    }

    let role = Role::role_of_user(pool, auth.user_id)
        .await?
        .ok_or(AuthzError::UnknownUser)?;

    if role != auth.role {
        tracing::info!(user_id = %auth.user_id, role = %role, "Token role is stale");
    }

    Ok(AuthContext::new(auth.user_id, role))
}

/// Checks a permission against a granted set
pub fn require_permission(granted: &[String], required: &str) -> Result<(), AuthzError> {
    if granted.iter().any(|p| p == required) {
        Ok(())
    } else {
        Err(AuthzError::PermissionDenied)
    }
}

fn owns_or_admin(auth: &AuthContext, todo: &Todo) -> bool {
    auth.is_admin() || todo.is_owned_by(auth.user_id)
}

/// Whether the caller may see a todo
pub fn can_view(auth: &AuthContext, todo: &Todo) -> bool {
    owns_or_admin(auth, todo)
}

/// Checks that the caller may edit a todo's title
///
/// Todos of other users are reported as missing. A completed todo can only
/// be edited by an admin.
pub fn check_edit(auth: &AuthContext, todo: &Todo) -> Result<(), AuthzError> {
    if !owns_or_admin(auth, todo) {
        return Err(AuthzError::NotFound);
    }

    if todo.completed && !auth.is_admin() {
        return Err(AuthzError::CompletedImmutable);
    }

    Ok(())
}

/// Checks that the caller may toggle a todo's completion state
///
/// Unlike [`check_edit`], completed todos may be reopened by their owner.
pub fn check_status_change(auth: &AuthContext, todo: &Todo) -> Result<(), AuthzError> {
    if !owns_or_admin(auth, todo) {
        return Err(AuthzError::NotFound);
    }

    Ok(())
}

/// Checks that the caller may delete a todo
pub fn check_delete(auth: &AuthContext, todo: &Todo) -> Result<(), AuthzError> {
    if !owns_or_admin(auth, todo) {
        return Err(AuthzError::NotFound);
    }

    Ok(())
}

/// Checks that the caller may update a user profile
pub fn check_user_update(auth: &AuthContext, target_user_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id != target_user_id && !auth.is_admin() {
        return Err(AuthzError::Forbidden(
            "You are not authorized to update this user".to_string(),
        ));
    }

    Ok(())
}

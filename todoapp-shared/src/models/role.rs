/// Role and permission model
///
/// Roles are rows in the `roles` table; each role grants a set of permissions
/// through the `role_permissions` join table. Every user references exactly one
/// role.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE roles (
///     id SERIAL PRIMARY KEY,
///     name VARCHAR(50) NOT NULL UNIQUE,
///     description VARCHAR(255)
/// );
///
/// CREATE TABLE permissions (
///     id SERIAL PRIMARY KEY,
///     name VARCHAR(100) NOT NULL UNIQUE
/// );
///
/// CREATE TABLE role_permissions (
///     role_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
///     permission_id INTEGER NOT NULL REFERENCES permissions(id) ON DELETE CASCADE,
///     PRIMARY KEY (role_id, permission_id)
/// );
/// ```
///
/// # Built-in Roles
///
/// - **admin**: every permission; may edit or delete any todo, including completed ones
/// - **user**: `todos:read` and `todos:write` on their own todos

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

/// Permission names seeded by the initial schema
pub mod permissions {
    /// Read own todos
    pub const TODOS_READ: &str = "todos:read";

    /// Create and modify own todos
    pub const TODOS_WRITE: &str = "todos:write";

    /// Read every user's todos
    pub const TODOS_READ_ALL: &str = "todos:read_all";

    /// Modify or delete any user's todos
    pub const TODOS_MANAGE_ALL: &str = "todos:manage_all";

    /// List user accounts
    pub const USERS_READ: &str = "users:read";

    /// Modify any user account
    pub const USERS_MANAGE: &str = "users:manage";
}

/// Role carried in tokens and auth contexts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    /// Administrator with the ownership override
    Admin,

    /// Regular account
    User,
}

impl RoleName {
    /// Role assigned at registration
    pub const DEFAULT: RoleName = RoleName::User;

    /// Name as stored in the `roles` table
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "admin",
            RoleName::User => "user",
        }
    }

    /// Whether this role bypasses ownership checks
    pub fn is_admin(&self) -> bool {
        matches!(self, RoleName::Admin)
    }

    /// Maps a `roles.name` value to a role
    ///
    /// Any name other than `admin` maps to `User`, so a role added to the
    /// database later never gains the admin override implicitly.
    pub fn from_db_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("admin") {
            RoleName::Admin
        } else {
            RoleName::User
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the `roles` table
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    /// Role ID
    pub id: i32,

    /// Unique role name (e.g. "admin")
    pub name: String,

    /// Optional human-readable description
    pub description: Option<String>,
}

impl Role {
    /// Typed role for this row
    pub fn role_name(&self) -> RoleName {
        RoleName::from_db_name(&self.name)
    }

    /// Finds a role by its name
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, description
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    /// Lists every role
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Role>("SELECT id, name, description FROM roles ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Looks up the current role of a user
    ///
    /// Returns `None` if the user does not exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use todoapp_shared::models::role::{Role, RoleName};
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    /// if Role::role_of_user(&pool, user_id).await? == Some(RoleName::Admin) {
    ///     println!("admin");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn role_of_user(pool: &PgPool, user_id: Uuid) -> Result<Option<RoleName>, sqlx::Error> {
        let name: Option<String> = sqlx::query_scalar(
            r#"
            SELECT roles.name
            FROM users
            JOIN roles ON users.role_id = roles.id
            WHERE users.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(name.as_deref().map(RoleName::from_db_name))
    }

    /// Lists the permission names granted to a user through their role
    pub async fn permissions_of_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT permissions.name
            FROM users
            JOIN roles ON users.role_id = roles.id
            JOIN role_permissions ON roles.id = role_permissions.role_id
            JOIN permissions ON role_permissions.permission_id = permissions.id
            WHERE users.id = $1
            ORDER BY permissions.name
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Lists the permission names granted to this role
    pub async fn permissions(&self, pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT permissions.name
            FROM role_permissions
            JOIN permissions ON role_permissions.permission_id = permissions.id
            WHERE role_permissions.role_id = $1
            ORDER BY permissions.name
            "#,
        )
        .bind(self.id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_name_as_str() {
        assert_eq!(RoleName::Admin.as_str(), "admin");
        assert_eq!(RoleName::User.as_str(), "user");
        assert_eq!(RoleName::Admin.to_string(), "admin");
    }

    #[test]
    fn test_unknown_role_names_are_not_admin() {
        assert_eq!(RoleName::from_db_name("admin"), RoleName::Admin);
        assert_eq!(RoleName::from_db_name("ADMIN"), RoleName::Admin);
        assert_eq!(RoleName::from_db_name("user"), RoleName::User);
        assert_eq!(RoleName::from_db_name("moderator"), RoleName::User);
        assert!(!RoleName::from_db_name("").is_admin());
    }

    #[test]
    fn test_role_name_serde() {
        let json = serde_json::to_string(&RoleName::Admin).unwrap();
        assert_eq!(json, "\"admin\"");

        let parsed: RoleName = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, RoleName::User);
    }

    #[test]
    fn test_role_row_name() {
        let role = Role {
            id: 1,
            name: "admin".to_string(),
            description: None,
        };
        assert_eq!(role.role_name(), RoleName::Admin);
        assert_eq!(RoleName::DEFAULT, RoleName::User);
    }
}

/// Todo model and database operations
///
/// Todos belong to the user that created them (`created_by`). Titles are
/// unique per owner; this is checked by the queries here rather than by a
/// database constraint.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE todos (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Ownership and completed-todo rules live in
/// [`crate::auth::authorization`]; this module performs no access checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A todo item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    /// Todo ID
    pub id: Uuid,

    /// Title, unique among the owner's todos
    pub title: String,

    /// Whether the todo has been completed
    pub completed: bool,

    /// Owner (user ID)
    pub created_by: Uuid,

    /// When the todo was created
    pub created_at: DateTime<Utc>,

    /// When the todo was last modified
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a todo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    /// Title
    pub title: String,

    /// Owner
    pub created_by: Uuid,
}

/// Input for editing a todo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodo {
    /// New title
    pub title: String,

    /// New completion state; `None` leaves it unchanged
    pub completed: Option<bool>,
}

impl Todo {
    /// Whether `user_id` owns this todo
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }

    /// Creates a todo unless its owner already has one with the same title
    ///
    /// The duplicate check and the insert run as a single statement.
    ///
    /// # Returns
    ///
    /// The new todo, or `None` if the title is already taken for this owner
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use todoapp_shared::models::todo::{CreateTodo, Todo};
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    /// match Todo::create(&pool, CreateTodo { title: "Write report".into(), created_by: user_id }).await? {
    ///     Some(todo) => println!("created {}", todo.id),
    ///     None => println!("title already exists"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(pool: &PgPool, data: CreateTodo) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (title, created_by)
            SELECT $1, $2
            WHERE NOT EXISTS (
                SELECT 1 FROM todos WHERE created_by = $2 AND title = $1
            )
            RETURNING id, title, completed, created_by, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.created_by)
        .fetch_optional(pool)
        .await
    }

    /// Finds a todo by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, completed, created_by, created_at, updated_at
            FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists the todos owned by a user, newest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, completed, created_by, created_at, updated_at
            FROM todos
            WHERE created_by = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }

    /// Lists every todo, newest first
    pub async fn list_all(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, completed, created_by, created_at, updated_at
            FROM todos
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Checks whether an owner has a todo with this title
    ///
    /// `exclude` skips one todo, so an edit that keeps its own title is not
    /// reported as a clash.
    pub async fn title_exists_for_owner(
        pool: &PgPool,
        owner_id: Uuid,
        title: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM todos
                WHERE created_by = $1
                  AND title = $2
                  AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(owner_id)
        .bind(title)
        .bind(exclude)
        .fetch_one(pool)
        .await
    }

    /// Updates the title (and optionally the completion state) of a todo
    ///
    /// Unless `allow_completed` is set, the row is only written while it is
    /// still open, so a todo completed concurrently stays untouched.
    ///
    /// # Returns
    ///
    /// The updated todo, or `None` if it no longer exists or is completed and
    /// `allow_completed` is false
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTodo,
        allow_completed: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
            SET title = $2,
                completed = COALESCE($3, completed),
                updated_at = NOW()
            WHERE id = $1
              AND (NOT completed OR $4)
            RETURNING id, title, completed, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.completed)
        .bind(allow_completed)
        .fetch_optional(pool)
        .await
    }

    /// Sets the completion state of a todo
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        completed: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
            SET completed = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, completed, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(completed)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a todo
    ///
    /// # Returns
    ///
    /// True if a row was deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts the todos owned by a user
    pub async fn count_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos WHERE created_by = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

/// Database models for Todoapp
///
/// This module contains all database models and their query operations.
///
/// # Models
///
/// - `role`: Roles, permissions and the role/permission join table
/// - `user`: User accounts and authentication data
/// - `todo`: Todo items owned by users
///
/// # Example
///
/// ```no_run
/// use todoapp_shared::models::todo::{CreateTodo, Todo};
/// use todoapp_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let todo = Todo::create(&pool, CreateTodo {
///     title: "Buy milk".to_string(),
///     created_by: Uuid::new_v4(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod role;
pub mod todo;
pub mod user;

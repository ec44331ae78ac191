/// Administrator endpoints
///
/// Mounted behind JWT authentication and a role/permission policy, so the
/// handlers themselves perform no access checks.
///
/// # Endpoints
///
/// - `GET /admin/todos` - Every user's todos (admin, `todos:read_all`)

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{pagination, Pagination},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use todoapp_shared::{auth::middleware::AuthContext, models::todo::Todo};

/// List every todo, newest first
///
/// Supports `?limit=&offset=`.
pub async fn list_all_todos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Option<Query<Pagination>>,
) -> ApiResult<Json<Vec<Todo>>> {
    let (limit, offset) = pagination(query).bounds();

    let todos = Todo::list_all(&state.db, limit, offset).await?;

    tracing::info!(
        admin_id = %auth.user_id,
        count = todos.len(),
        "Admin listed all todos"
    );

    Ok(Json(todos))
}

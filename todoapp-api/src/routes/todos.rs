/// Todo endpoints
///
/// Every route here requires a valid access token. Callers see and modify
/// only their own todos; admins may modify anyone's. A todo owned by
/// someone else is reported as missing.
///
/// # Endpoints
///
/// - `POST   /todo` - Create a todo
/// - `GET    /todo` - List the caller's todos, newest first
/// - `PUT    /todo/:id` - Edit title (and optionally completion)
/// - `PUT    /todo/status/:id` - Set completion
/// - `DELETE /todo/:id` - Delete a todo

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{path_id, required, users::MessageResponse},
};
use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use todoapp_shared::{
    auth::{
        authorization::{
            check_delete, check_edit, check_status_change, verified_context, AuthzError,
        },
        middleware::AuthContext,
    },
    models::todo::{CreateTodo, Todo, UpdateTodo},
};
use uuid::Uuid;
use validator::Validate;

const NOT_FOUND: &str = "Todo not found";

/// Create request
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    /// Title
    pub title: Option<String>,
}

/// Edit request
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    /// New title
    pub title: Option<String>,

    /// New completion state
    pub completed: Option<bool>,
}

/// Status request
///
/// `completed` is kept as raw JSON so that a non-boolean value is rejected
/// with the same message as a missing one.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Completion state; must be a JSON boolean
    pub completed: Option<serde_json::Value>,
}

#[derive(Debug, Validate)]
struct TodoTitle {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    title: String,
}

/// Confirmation plus the affected todo
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoMessageResponse {
    /// Confirmation message
    pub message: String,

    /// The todo after the change
    pub todo: Todo,
}

fn not_found() -> ApiError {
    ApiError::NotFound(NOT_FOUND.to_string())
}

fn validated_title(title: Option<String>, missing: &str) -> ApiResult<String> {
    let title = required(title).ok_or_else(|| ApiError::BadRequest(missing.to_string()))?;

    let checked = TodoTitle { title };
    checked.validate()?;

    Ok(checked.title)
}

async fn load_todo(state: &AppState, id: Uuid) -> ApiResult<Todo> {
    Todo::find_by_id(&state.db, id).await?.ok_or_else(not_found)
}

/// Create a todo owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: blank title
/// - `409 Conflict`: the caller already has a todo with this title
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let Json(req) = payload?;
    let title = validated_title(req.title, "All fields are required")?;

    let todo = Todo::create(
        &state.db,
        CreateTodo {
            title,
            created_by: auth.user_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::Conflict("Title already exists".to_string()))?;

    tracing::info!(todo_id = %todo.id, user_id = %auth.user_id, "Todo created");

    Ok((StatusCode::CREATED, Json(todo)))
}

/// List the caller's todos, newest first
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Todo>>> {
    let todos = Todo::list_by_owner(&state.db, auth.user_id).await?;

    tracing::debug!(user_id = %auth.user_id, count = todos.len(), "Listed todos");

    Ok(Json(todos))
}

/// Edit a todo
///
/// # Errors
///
/// - `400 Bad Request`: blank title, or the todo is completed and the caller is not an admin
/// - `404 Not Found`: no such todo, or it belongs to someone else
/// - `409 Conflict`: the owner has another todo with this title
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> ApiResult<Json<TodoMessageResponse>> {
    let id = path_id(path, NOT_FOUND)?;
    let Json(req) = payload?;
    let title = validated_title(req.title, "Fields are required")?;

    let auth = verified_context(&state.db, &auth).await?;
    let todo = load_todo(&state, id).await?;
    check_edit(&auth, &todo).map_err(|e| {
        tracing::warn!(todo_id = %id, user_id = %auth.user_id, error = %e, "Todo edit refused");
        ApiError::from(e)
    })?;

    if Todo::title_exists_for_owner(&state.db, todo.created_by, &title, Some(id)).await? {
        return Err(ApiError::Conflict("Title already exists".to_string()));
    }

    let update = UpdateTodo {
        title,
        completed: req.completed,
    };

    let todo = match Todo::update(&state.db, id, update, auth.is_admin()).await? {
        Some(todo) => todo,
        // Completed or deleted since it was checked
        None => {
            return Err(match Todo::find_by_id(&state.db, id).await? {
                Some(current) if current.completed => AuthzError::CompletedImmutable.into(),
                _ => not_found(),
            })
        }
    };

    tracing::info!(todo_id = %id, user_id = %auth.user_id, "Todo updated");

    Ok(Json(TodoMessageResponse {
        message: "Todo updated successfully".to_string(),
        todo,
    }))
}

/// Set a todo's completion state
///
/// Completed todos may be reopened by their owner.
///
/// # Errors
///
/// - `400 Bad Request`: `completed` missing or not a boolean
/// - `404 Not Found`: no such todo, or it belongs to someone else
pub async fn update_todo_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<TodoMessageResponse>> {
    let id = path_id(path, NOT_FOUND)?;
    let Json(req) = payload?;

    let completed = req
        .completed
        .as_ref()
        .and_then(serde_json::Value::as_bool)
        .ok_or_else(|| ApiError::BadRequest("Fields are required".to_string()))?;

    let auth = verified_context(&state.db, &auth).await?;
    let todo = load_todo(&state, id).await?;
    check_status_change(&auth, &todo)?;

    let todo = Todo::update_status(&state.db, id, completed)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(todo_id = %id, completed, "Todo status changed");

    Ok(Json(TodoMessageResponse {
        message: "Status updated successfully".to_string(),
        todo,
    }))
}

/// Delete a todo
///
/// # Errors
///
/// - `404 Not Found`: no such todo, or it belongs to someone else
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = path_id(path, NOT_FOUND)?;

    let auth = verified_context(&state.db, &auth).await?;
    let todo = load_todo(&state, id).await?;
    check_delete(&auth, &todo)?;

    if !Todo::delete(&state.db, id).await? {
        return Err(not_found());
    }

    tracing::info!(todo_id = %id, user_id = %auth.user_id, "Todo deleted");

    Ok(MessageResponse::new("Todo deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_title() {
        assert_eq!(
            validated_title(Some("  Buy milk ".to_string()), "x").unwrap(),
            "Buy milk"
        );

        match validated_title(Some("   ".to_string()), "All fields are required") {
            Err(ApiError::BadRequest(msg)) => assert_eq!(msg, "All fields are required"),
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            validated_title(Some("x".repeat(256)), "x"),
            Err(ApiError::ValidationError(_))
        ));
    }

    #[test]
    fn test_status_request_accepts_only_booleans() {
        let req: UpdateStatusRequest = serde_json::from_str(r#"{"completed": "yes"}"#).unwrap();
        assert_eq!(req.completed.as_ref().and_then(serde_json::Value::as_bool), None);

        let req: UpdateStatusRequest = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert_eq!(req.completed.as_ref().and_then(serde_json::Value::as_bool), Some(true));
    }
}

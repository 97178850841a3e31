//! Todo handlers. The owner always comes from the verified token, never the body.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::routes::TodoApiState;
use crate::auth::AuthContext;
use crate::domain::{NewTodo, Todo, TodoId, TodoPatch};
use crate::errors::Error;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTodoRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTodoRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl From<UpdateTodoRequest> for TodoPatch {
    fn from(request: UpdateTodoRequest) -> Self {
        TodoPatch {
            title: request.title,
            description: request.description,
            completed: request.completed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

#[instrument(skip(state, context, payload), fields(owner = %context.user_id))]
pub async fn create_todo_handler(
    State(state): State<TodoApiState>,
    Extension(context): Extension<AuthContext>,
    ApiJson(payload): ApiJson<CreateTodoRequest>,
) -> Result<Json<Todo>, ApiError> {
    payload.validate().map_err(Error::from)?;

    let todo = state
        .todos
        .create(context.user_id, NewTodo { title: payload.title, description: payload.description })
        .await?;
    Ok(Json(todo))
}

#[instrument(skip(state, context), fields(owner = %context.user_id))]
pub async fn list_todos_handler(
    State(state): State<TodoApiState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(state.todos.list(context.user_id).await?))
}

#[instrument(skip(state, context), fields(owner = %context.user_id, todo_id = %id))]
pub async fn get_todo_handler(
    State(state): State<TodoApiState>,
    Extension(context): Extension<AuthContext>,
    ApiPath(id): ApiPath<TodoId>,
) -> Result<Json<Todo>, ApiError> {
    Ok(Json(state.todos.get(context.user_id, id).await?))
}

#[instrument(skip(state, context, payload), fields(owner = %context.user_id, todo_id = %id))]
pub async fn update_todo_handler(
    State(state): State<TodoApiState>,
    Extension(context): Extension<AuthContext>,
    ApiPath(id): ApiPath<TodoId>,
    ApiJson(payload): ApiJson<UpdateTodoRequest>,
) -> Result<Json<Todo>, ApiError> {
    payload.validate().map_err(Error::from)?;

    Ok(Json(state.todos.update(context.user_id, id, payload.into()).await?))
}

#[instrument(skip(state, context), fields(owner = %context.user_id, todo_id = %id))]
pub async fn delete_todo_handler(
    State(state): State<TodoApiState>,
    Extension(context): Extension<AuthContext>,
    ApiPath(id): ApiPath<TodoId>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.todos.delete(context.user_id, id).await?;
    Ok(Json(MessageResponse { message: "Todo deleted successfully".to_string() }))
}

pub async fn list_all_todos_handler(
    State(state): State<TodoApiState>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(state.todos.list_all().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_keeps_absent_fields_absent() {
        let request: UpdateTodoRequest = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        let patch = TodoPatch::from(request);
        assert_eq!(patch, TodoPatch { completed: Some(true), ..Default::default() });

        let empty: UpdateTodoRequest = serde_json::from_str("{}").unwrap();
        assert!(TodoPatch::from(empty).is_empty());
    }

    #[test]
    fn blank_title_is_rejected() {
        let create = CreateTodoRequest { title: String::new(), description: None };
        assert!(create.validate().is_err());

        let update = UpdateTodoRequest { title: Some(String::new()), ..Default::default() };
        assert!(update.validate().is_err());
        assert!(UpdateTodoRequest::default().validate().is_ok());
    }
}

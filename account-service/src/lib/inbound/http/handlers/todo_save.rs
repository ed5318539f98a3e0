use axum::extract::State;
use axum::Extension;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use crate::domain::todo::errors::TodoError;
use crate::domain::todo::models::Category;
use crate::domain::todo::models::SaveTodoCommand;
use crate::domain::todo::models::TodoId;
use crate::domain::todo::models::TodoStatus;
use crate::domain::todo::models::TodoText;
use crate::inbound::http::middleware::RequestContext;
use crate::inbound::http::router::AppState;

/// Insert a todo (`tid` 0) or overwrite one of the caller's todos.
pub async fn todo_save(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    JsonBody(body): JsonBody<TodoSaveRequest>,
) -> Result<ApiSuccess<TodoSaveResponseData>, ApiError> {
    let command = body.try_into_command().map_err(TodoSaveFailure::from)?;

    let todo = state
        .todo_service
        .save(&context.caller.id, command)
        .await
        .map_err(|e| {
            if let TodoError::PermissionDenied(ref tid) = e {
                tracing::warn!(user_id = %context.caller.id, todo_id = %tid, "Todo save denied");
            }
            TodoSaveFailure::from(e)
        })?;

    Ok(ApiSuccess::new(TodoSaveResponseData { tid: todo.id.0 }))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TodoSaveRequest {
    tid: i64,
    limittime: i64,
    #[serde(default)]
    category: String,
    todo: String,
    #[serde(default)]
    status: i16,
}

impl TodoSaveRequest {
    fn try_into_command(self) -> Result<SaveTodoCommand, TodoError> {
        let id = match self.tid {
            0 => None,
            tid if tid > 0 => Some(TodoId(tid)),
            tid => return Err(TodoError::NotFound(tid.to_string())),
        };

        Ok(SaveTodoCommand {
            id,
            category: Category::new(self.category)?,
            text: TodoText::new(self.todo)?,
            limit_time: self.limittime,
            status: TodoStatus::try_from(self.status)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoSaveResponseData {
    pub tid: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoSaveFailure {
    BadRequest,
    NoPermission,
    DatabaseError,
}

impl From<TodoError> for TodoSaveFailure {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::InvalidCategory(_)
            | TodoError::InvalidText(_)
            | TodoError::InvalidStatus(_)
            | TodoError::InvalidRange { .. } => TodoSaveFailure::BadRequest,
            TodoError::PermissionDenied(_) => TodoSaveFailure::NoPermission,
            TodoError::NotFound(_) => TodoSaveFailure::DatabaseError,
            TodoError::DatabaseError(e) => {
                tracing::error!(error = %e, "Saving todo failed");
                TodoSaveFailure::DatabaseError
            }
        }
    }
}

impl From<TodoSaveFailure> for ApiError {
    fn from(failure: TodoSaveFailure) -> Self {
        match failure {
            TodoSaveFailure::BadRequest => ApiError::new(-1510, "Invalid todo."),
            TodoSaveFailure::NoPermission => {
                ApiError::new(-1530, "You might not have permission to save this todo.")
            }
            TodoSaveFailure::DatabaseError => {
                ApiError::new(-1540, "Error occured during todo save.")
            }
        }
    }
}

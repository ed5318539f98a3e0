use axum::extract::State;
use axum::Extension;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use crate::domain::todo::models::TimeRange;
use crate::domain::todo::models::Todo;
use crate::inbound::http::middleware::RequestContext;
use crate::inbound::http::router::AppState;

pub async fn todo_list(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    JsonBody(body): JsonBody<TodoListRequest>,
) -> Result<ApiSuccess<TodoListResponseData>, ApiError> {
    let range = TimeRange::new(body.sdate, body.edate)
        .map_err(|_| ApiError::new(-1410, "Invalid date range."))?;

    let todos = state
        .todo_service
        .list(&context.caller.id, range)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %context.caller.id, error = %e, "Listing todos failed");
            ApiError::new(-1420, "Error occured during todo list.")
        })?;

    Ok(ApiSuccess::new(TodoListResponseData {
        todolist: todos.iter().map(TodoData::from).collect(),
    }))
}

/// Deadline window, unix seconds, both ends inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TodoListRequest {
    sdate: i64,
    edate: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoListResponseData {
    pub todolist: Vec<TodoData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoData {
    pub tid: i64,
    pub owneruid: i64,
    pub category: String,
    pub todo: String,
    pub limittime: i64,
    pub status: i16,
}

impl From<&Todo> for TodoData {
    fn from(todo: &Todo) -> Self {
        Self {
            tid: todo.id.0,
            owneruid: todo.owner.0,
            category: todo.category.as_str().to_string(),
            todo: todo.text.as_str().to_string(),
            limittime: todo.limit_time,
            status: todo.status.code(),
        }
    }
}

use axum::extract::State;
use axum::Extension;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::Empty;
use super::JsonBody;
use crate::domain::todo::errors::TodoError;
use crate::domain::todo::models::TodoId;
use crate::inbound::http::middleware::RequestContext;
use crate::inbound::http::router::AppState;

pub async fn todo_remove(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    JsonBody(body): JsonBody<TodoRemoveRequest>,
) -> Result<ApiSuccess<Empty>, ApiError> {
    if body.tid <= 0 {
        return Err(TodoRemoveFailure::BadRequest.into());
    }

    state
        .todo_service
        .remove(&context.caller.id, &TodoId(body.tid))
        .await
        .map_err(|e| {
            if let TodoError::PermissionDenied(ref tid) = e {
                tracing::warn!(user_id = %context.caller.id, todo_id = %tid, "Todo removal denied");
            }
            TodoRemoveFailure::from(e)
        })?;

    Ok(ApiSuccess::new(Empty {}))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TodoRemoveRequest {
    tid: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoRemoveFailure {
    BadRequest,
    ServerError,
    NoPermission,
    DatabaseError,
}

impl From<TodoError> for TodoRemoveFailure {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::PermissionDenied(_) => TodoRemoveFailure::NoPermission,
            TodoError::NotFound(_) => TodoRemoveFailure::DatabaseError,
            TodoError::DatabaseError(e) => {
                tracing::error!(error = %e, "Removing todo failed");
                TodoRemoveFailure::DatabaseError
            }
            e => {
                tracing::error!(error = %e, "Removing todo failed");
                TodoRemoveFailure::ServerError
            }
        }
    }
}

impl From<TodoRemoveFailure> for ApiError {
    fn from(failure: TodoRemoveFailure) -> Self {
        match failure {
            TodoRemoveFailure::BadRequest => ApiError::new(-1610, "Invalid todo id."),
            TodoRemoveFailure::ServerError => {
                ApiError::new(-1620, "Error occured during todo remove.")
            }
            TodoRemoveFailure::NoPermission => {
                ApiError::new(-1630, "You might not have permission to remove this todo.")
            }
            TodoRemoveFailure::DatabaseError => {
                ApiError::new(-1640, "Error occured during todo remove.")
            }
        }
    }
}

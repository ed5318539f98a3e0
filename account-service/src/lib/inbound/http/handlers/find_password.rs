use axum::extract::State;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::Empty;
use super::JsonBody;
use crate::domain::user::models::LoginName;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Mail a single-use temporary password to the account's address.
pub async fn find_password(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<FindPasswordRequest>,
) -> Result<ApiSuccess<Empty>, ApiError> {
    let login_name = LoginName::new(body.id).map_err(|_| FindPasswordFailure::BadId)?;

    state
        .user_service
        .request_password_reset(&login_name)
        .await
        .map_err(FindPasswordFailure::from)?;

    Ok(ApiSuccess::new(Empty {}))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FindPasswordRequest {
    id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindPasswordFailure {
    BadId,
    NoUser,
    ServerError,
}

impl From<UserError> for FindPasswordFailure {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidLoginName(_) => FindPasswordFailure::BadId,
            UserError::NotFound(_) => FindPasswordFailure::NoUser,
            e => {
                tracing::error!(error = %e, "Password reset failed");
                FindPasswordFailure::ServerError
            }
        }
    }
}

impl From<FindPasswordFailure> for ApiError {
    fn from(failure: FindPasswordFailure) -> Self {
        match failure {
            FindPasswordFailure::BadId => ApiError::new(-1710, "Invalid email format."),
            FindPasswordFailure::NoUser => ApiError::new(-1720, "Incorrect ID."),
            FindPasswordFailure::ServerError => {
                ApiError::new(-1730, "Error occured during password reset.")
            }
        }
    }
}

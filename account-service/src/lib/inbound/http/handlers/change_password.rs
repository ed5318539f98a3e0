use axum::extract::State;
use axum::Extension;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::Empty;
use super::JsonBody;
use crate::domain::user::models::Password;
use crate::inbound::http::middleware::RequestContext;
use crate::inbound::http::router::AppState;

pub async fn change_password(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    JsonBody(body): JsonBody<ChangePasswordRequest>,
) -> Result<ApiSuccess<Empty>, ApiError> {
    let password =
        Password::new(body.password).map_err(|_| ApiError::new(-1810, "Invalid password format."))?;

    state
        .user_service
        .change_password(&context.caller.id, password)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %context.caller.id, error = %e, "Password change failed");
            ApiError::new(-1820, "Error occured during password change.")
        })?;

    tracing::info!(user_id = %context.caller.id, "Password changed");

    Ok(ApiSuccess::new(Empty {}))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    password: String,
}

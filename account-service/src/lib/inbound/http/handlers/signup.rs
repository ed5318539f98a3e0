use axum::extract::State;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::Empty;
use super::JsonBody;
use crate::domain::user::models::LoginName;
use crate::domain::user::models::Password;
use crate::domain::user::models::SignupCommand;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn signup(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SignupRequest>,
) -> Result<ApiSuccess<Empty>, ApiError> {
    let require_activation = state.config.read().await.activation.enabled;
    let command = body.try_into_command(require_activation)?;

    let user = state
        .user_service
        .signup(command)
        .await
        .map_err(SignupFailure::from)?;

    tracing::info!(
        user_id = %user.id,
        status = %user.status,
        "Account registered"
    );

    Ok(ApiSuccess::new(Empty {}))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignupRequest {
    id: String,
    password: String,
}

impl SignupRequest {
    fn try_into_command(self, require_activation: bool) -> Result<SignupCommand, SignupFailure> {
        let login_name = LoginName::new(self.id).map_err(|_| SignupFailure::BadId)?;
        let password = Password::new(self.password).map_err(|_| SignupFailure::BadPassword)?;
        Ok(SignupCommand::new(login_name, password, require_activation))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupFailure {
    BadId,
    BadPassword,
    ServerError,
    Duplicated,
}

impl From<UserError> for SignupFailure {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidLoginName(_) => SignupFailure::BadId,
            UserError::InvalidPassword(_) => SignupFailure::BadPassword,
            UserError::LoginNameAlreadyExists(_) => SignupFailure::Duplicated,
            e => {
                tracing::error!(error = %e, "Sign up failed");
                SignupFailure::ServerError
            }
        }
    }
}

impl From<SignupFailure> for ApiError {
    fn from(failure: SignupFailure) -> Self {
        match failure {
            SignupFailure::BadId => ApiError::new(-1010, "Invalid email format."),
            SignupFailure::BadPassword => ApiError::new(-1020, "Invalid password format."),
            SignupFailure::ServerError => ApiError::new(-1030, "Error occured during sign up."),
            SignupFailure::Duplicated => ApiError::new(-1040, "Email already exists."),
        }
    }
}

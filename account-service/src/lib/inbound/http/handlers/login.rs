use axum::extract::State;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::LoginName;
use crate::domain::user::models::LoginOutcome;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    // A malformed id can never name an account
    let login_name = LoginName::new(body.id).map_err(|_| LoginFailure::BadId)?;

    let outcome = state
        .user_service
        .login(LoginCommand {
            login_name,
            password: body.password,
        })
        .await
        .map_err(LoginFailure::from)?;

    Ok(ApiSuccess::new(outcome.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    id: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
    /// Logged in with a temporary password; a new password should be set
    pub templogin: bool,
}

impl From<LoginOutcome> for LoginResponseData {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            templogin: outcome.is_temporary(),
            token: outcome.token,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    BadId,
    ServerError,
    IncorrectCredentials,
    NotActivated,
    Blocked,
    TokenIssue,
}

impl From<UserError> for LoginFailure {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidLoginName(_) => LoginFailure::BadId,
            UserError::InvalidCredentials | UserError::InvalidPassword(_) => {
                LoginFailure::IncorrectCredentials
            }
            UserError::NotActivated => LoginFailure::NotActivated,
            UserError::Blocked => LoginFailure::Blocked,
            UserError::TokenIssue(e) => {
                tracing::error!(error = %e, "Token issuance failed");
                LoginFailure::TokenIssue
            }
            e => {
                tracing::error!(error = %e, "Login failed");
                LoginFailure::ServerError
            }
        }
    }
}

impl From<LoginFailure> for ApiError {
    fn from(failure: LoginFailure) -> Self {
        match failure {
            LoginFailure::BadId => ApiError::new(-1110, "Invalid email format."),
            LoginFailure::ServerError => ApiError::new(-1130, "Error occured during login."),
            LoginFailure::IncorrectCredentials => {
                ApiError::new(-1140, "Incorrect ID or Password.")
            }
            LoginFailure::NotActivated => ApiError::new(
                -1150,
                "Account not yet activated. Please check your email.",
            ),
            LoginFailure::Blocked => ApiError::new(
                -1160,
                "System has blocked your account. Please contact the support team for more information.",
            ),
            LoginFailure::TokenIssue => ApiError::new(-1199, "Error occured during issue token."),
        }
    }
}

use axum::extract::State;
use axum::Extension;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::Empty;
use super::JsonBody;
use crate::config::Config;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::inbound::http::middleware::RequestContext;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Re-read the configuration sources and swap the shared configuration.
///
/// Settings consumed per request (activation switch, SMTP relay, public URL)
/// follow the new values; the key pair, pool and listen port keep the values
/// they were started with.
pub async fn reload_config(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
) -> Result<ApiSuccess<Empty>, ApiError> {
    let config = Config::load().map_err(|e| {
        tracing::error!(error = %e, "Configuration reload failed");
        AdminFailure::BadConfigFile
    })?;

    *state.config.write().await = config;

    tracing::info!(admin_id = %context.caller.id, "Configuration reloaded");

    Ok(ApiSuccess::new(Empty {}))
}

pub async fn block_user(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    JsonBody(body): JsonBody<AdminUserRequest>,
) -> Result<ApiSuccess<AdminUserResponseData>, ApiError> {
    let reason = body.reason.unwrap_or_default();

    state
        .user_service
        .block(&UserId(body.uid), &reason)
        .await
        .map_err(AdminFailure::from)
        .map(|ref user| {
            tracing::info!(
                admin_id = %context.caller.id,
                user_id = %user.id,
                reason = %reason,
                "User blocked by admin"
            );
            ApiSuccess::new(user.into())
        })
        .map_err(ApiError::from)
}

pub async fn unblock_user(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    JsonBody(body): JsonBody<AdminUserRequest>,
) -> Result<ApiSuccess<AdminUserResponseData>, ApiError> {
    let reason = body.reason.unwrap_or_default();

    state
        .user_service
        .unblock(&UserId(body.uid), &reason)
        .await
        .map_err(AdminFailure::from)
        .map(|ref user| {
            tracing::info!(
                admin_id = %context.caller.id,
                user_id = %user.id,
                reason = %reason,
                "User unblocked by admin"
            );
            ApiSuccess::new(user.into())
        })
        .map_err(ApiError::from)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdminUserRequest {
    uid: i64,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminUserResponseData {
    pub uid: i64,
    pub status: i16,
}

impl From<&User> for AdminUserResponseData {
    fn from(user: &User) -> Self {
        Self {
            uid: user.id.0,
            status: user.status.code(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminFailure {
    BadRequest,
    ServerError,
    PermissionDenied,
    BadConfigFile,
    NoSuchUser,
    InvalidTransition,
}

impl From<UserError> for AdminFailure {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => AdminFailure::NoSuchUser,
            UserError::InvalidTransition { .. } => AdminFailure::InvalidTransition,
            UserError::InvalidLoginName(_) | UserError::InvalidPassword(_) => {
                AdminFailure::BadRequest
            }
            e => {
                tracing::error!(error = %e, "Admin operation failed");
                AdminFailure::ServerError
            }
        }
    }
}

impl From<AdminFailure> for ApiError {
    fn from(failure: AdminFailure) -> Self {
        match failure {
            AdminFailure::BadRequest => ApiError::new(-10, "bad request."),
            AdminFailure::ServerError => ApiError::new(-20, "server error."),
            AdminFailure::PermissionDenied => ApiError::new(-30, "permission denied."),
            AdminFailure::BadConfigFile => ApiError::new(-40, "bad config file."),
            AdminFailure::NoSuchUser => ApiError::new(-50, "no such user."),
            AdminFailure::InvalidTransition => {
                ApiError::new(-60, "user is not in a state this operation applies to.")
            }
        }
    }
}

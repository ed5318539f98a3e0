use axum::extract::Path;
use axum::extract::State;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::ActivationKey;
use crate::domain::user::models::User;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Redeem the key from an activation mail.
///
/// Answers with the same JSON envelope as every other route, not an HTML
/// page; a browser following the mailed link sees `{"res": 0, ...}`.
/// Unknown, malformed and already redeemed keys all answer with the common
/// not-found code.
pub async fn activate(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ApiSuccess<ActivationResponseData>, ApiError> {
    let key = ActivationKey::parse(&key).map_err(|_| ApiError::not_found())?;

    state
        .user_service
        .activate(&key)
        .await
        .map_err(|e| match e {
            UserError::NotFound(_) => ApiError::not_found(),
            e => {
                tracing::error!(error = %e, "Activation failed");
                ApiError::internal_server_error()
            }
        })
        .map(|ref user| ApiSuccess::new(user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationResponseData {
    pub id: String,
}

impl From<&User> for ActivationResponseData {
    fn from(user: &User) -> Self {
        Self {
            id: user.login_name.as_str().to_string(),
        }
    }
}

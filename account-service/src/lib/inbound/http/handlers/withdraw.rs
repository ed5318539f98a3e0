use axum::extract::State;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::Empty;
use crate::inbound::http::middleware::RequestContext;
use crate::inbound::http::router::AppState;

/// Delete the caller's account and everything it owns.
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
) -> Result<ApiSuccess<Empty>, ApiError> {
    state
        .user_service
        .withdraw(&context.caller.id)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %context.caller.id, error = %e, "Withdrawal failed");
            ApiError::new(-1320, "Error occured during withdrawal.")
        })?;

    tracing::info!(user_id = %context.caller.id, "Account withdrawn");

    Ok(ApiSuccess::new(Empty {}))
}

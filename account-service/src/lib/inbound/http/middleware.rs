use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::admin::AdminFailure;
use super::handlers::ApiError;
use crate::config::SharedConfig;
use crate::domain::user::gatekeeper::GateError;
use crate::domain::user::models::User;
use crate::inbound::http::router::AppState;

/// Per-request context of an admitted caller, stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub caller: User,
    pub config: SharedConfig,
}

/// Middleware that admits the bearer of a valid token whose account is Normal
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(req.headers())?;

    let caller = state.gatekeeper.admit(&token).await.map_err(|e| {
        match e {
            GateError::Internal(ref cause) => {
                tracing::error!(error = %cause, "Admission failed")
            }
            _ => tracing::debug!(uri = %req.uri(), "Request rejected: login required"),
        }
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(RequestContext {
        caller,
        config: state.config.clone(),
    });

    Ok(next.run(req).await)
}

/// Middleware that lets only admins through.
///
/// Must run after `authenticate`.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = req
        .extensions()
        .get::<RequestContext>()
        .map(|context| context.caller.clone())
        .ok_or_else(ApiError::unauthorized)?;

    state
        .gatekeeper
        .require_admin(&caller)
        .await
        .map_err(|e| match e {
            GateError::PermissionDenied => {
                tracing::warn!(
                    user_id = %caller.id,
                    uri = %req.uri(),
                    "Admin operation attempted by non-admin"
                );
                ApiError::from(AdminFailure::PermissionDenied)
            }
            GateError::Internal(cause) => {
                tracing::error!(user_id = %caller.id, error = %cause, "Admin check failed");
                ApiError::from(AdminFailure::ServerError)
            }
            GateError::Unauthorized => ApiError::unauthorized(),
        })?;

    Ok(next.run(req).await)
}

fn extract_token_from_header(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_str = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(ApiError::unauthorized)?;

    auth_str
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(ApiError::unauthorized)
}

use axum::Extension;

use super::ApiSuccess;
use super::Empty;
use crate::inbound::http::middleware::RequestContext;

/// Tokens are stateless, so there is nothing to revoke server-side; the
/// client discards its token.
pub async fn logout(Extension(context): Extension<RequestContext>) -> ApiSuccess<Empty> {
    tracing::info!(user_id = %context.caller.id, "Logged out");
    ApiSuccess::new(Empty {})
}

use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use thiserror::Error;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::status::Transition;
use crate::domain::user::status::UserStatus;
use crate::user::ports::UserRepository;

/// What happens to a caller that invokes an admin-only operation without
/// being an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminViolationSanction {
    /// Block the caller's account (Normal -> Blocked).
    #[default]
    BlockCaller,
    /// Reject the request and leave the account untouched.
    DenyOnly,
}

/// Admission failures.
///
/// `Unauthorized` deliberately carries no reason: a missing, forged, expired
/// token and a deleted or blocked account all look the same to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Login required")]
    Unauthorized,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Per-request admission checks for authenticated operations.
#[async_trait]
pub trait GatekeeperPort: Send + Sync + 'static {
    /// Resolve a bearer token to an account allowed to proceed.
    ///
    /// # Errors
    /// * `Unauthorized` - Invalid token, unknown account, or account not Normal
    /// * `Internal` - Storage failure while loading the account
    async fn admit(&self, bearer_token: &str) -> Result<User, GateError>;

    /// Require the admitted caller to be an admin, sanctioning it otherwise.
    ///
    /// # Errors
    /// * `PermissionDenied` - Caller is not an admin
    /// * `Internal` - Storage failure while applying the sanction
    async fn require_admin(&self, caller: &User) -> Result<(), GateError>;
}

pub struct Gatekeeper<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    sanction: AdminViolationSanction,
}

impl<UR> Gatekeeper<UR>
where
    UR: UserRepository,
{
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        sanction: AdminViolationSanction,
    ) -> Self {
        Self {
            repository,
            authenticator,
            sanction,
        }
    }
}

#[async_trait]
impl<UR> GatekeeperPort for Gatekeeper<UR>
where
    UR: UserRepository,
{
    async fn admit(&self, bearer_token: &str) -> Result<User, GateError> {
        let claims = self
            .authenticator
            .validate_token(bearer_token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Bearer token rejected");
                GateError::Unauthorized
            })?;

        let user_id = UserId(claims.uid);
        let user = self
            .repository
            .find_by_id(&user_id)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user_id, error = %e, "Failed to load caller");
                GateError::Internal(e.to_string())
            })?
            .ok_or_else(|| {
                tracing::debug!(user_id = %user_id, "Token subject no longer exists");
                GateError::Unauthorized
            })?;

        if user.status != UserStatus::Normal {
            tracing::warn!(user_id = %user.id, status = %user.status, "Rejected caller with non-normal status");
            return Err(GateError::Unauthorized);
        }

        Ok(user)
    }

    async fn require_admin(&self, caller: &User) -> Result<(), GateError> {
        if caller.is_admin() {
            return Ok(());
        }

        match self.sanction {
            AdminViolationSanction::BlockCaller => {
                let blocked = self
                    .repository
                    .transition_status(
                        &caller.id,
                        Transition::Block.source(),
                        Transition::Block.target(),
                    )
                    .await
                    .map_err(|e| {
                        tracing::error!(user_id = %caller.id, error = %e, "Failed to block caller");
                        GateError::Internal(e.to_string())
                    })?;

                tracing::warn!(
                    user_id = %caller.id,
                    blocked,
                    reason = "admin operation called without permission",
                    "Admin gate violation"
                );
            }
            AdminViolationSanction::DenyOnly => {
                tracing::warn!(user_id = %caller.id, "Admin gate violation");
            }
        }

        Err(GateError::PermissionDenied)
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::LoginKind;
use chrono::Utc;

use crate::domain::user::models::AccountType;
use crate::domain::user::models::ActivationKey;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::LoginName;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::SignupCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::status::Transition;
use crate::domain::user::status::UserStatus;
use crate::user::errors::UserError;
use crate::user::ports::Mailer;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for account operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR, M>
where
    UR: UserRepository,
    M: Mailer,
{
    repository: Arc<UR>,
    mailer: Arc<M>,
    authenticator: Arc<Authenticator>,
}

impl<UR, M> UserService<UR, M>
where
    UR: UserRepository,
    M: Mailer,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `mailer` - Outbound mail implementation
    /// * `authenticator` - Credential and token primitives
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<UR>, mailer: Arc<M>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            mailer,
            authenticator,
        }
    }

    fn build_credential(&self, password: &Password) -> Result<auth::Credential, UserError> {
        self.authenticator
            .hash_password(password.as_str())
            .map_err(|e| UserError::Credential(e.to_string()))
    }

    async fn apply_transition(
        &self,
        id: &UserId,
        transition: Transition,
    ) -> Result<User, UserError> {
        let user = self.get_user(id).await?;
        let target = transition.check(user.status)?;

        if !self
            .repository
            .transition_status(id, transition.source(), target)
            .await?
        {
            // Lost a race against another transition
            let current = self.get_user(id).await?;
            return Err(UserError::InvalidTransition {
                from: current.status,
                transition,
            });
        }

        Ok(User {
            status: target,
            activation_key: None,
            ..user
        })
    }
}

#[async_trait]
impl<UR, M> UserServicePort for UserService<UR, M>
where
    UR: UserRepository,
    M: Mailer,
{
    async fn signup(&self, command: SignupCommand) -> Result<User, UserError> {
        let credential = self.build_credential(&command.password)?;

        let (status, activation_key) = if command.require_activation {
            (UserStatus::Deactivated, Some(ActivationKey::new()))
        } else {
            (UserStatus::Normal, None)
        };

        let user = self
            .repository
            .insert(NewUser {
                login_name: command.login_name,
                status,
                account_type: AccountType::Normal,
                credential,
                activation_key,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(user_id = %user.id, status = %user.status, "User signed up");

        if let Some(key) = &user.activation_key {
            self.mailer.send_activation(&user, key).await.map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Failed to send activation mail");
                e
            })?;
        }

        Ok(user)
    }

    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, UserError> {
        let Some(user) = self
            .repository
            .find_by_login_name(&command.login_name)
            .await?
        else {
            self.authenticator.verify_dummy(&command.password);
            return Err(UserError::InvalidCredentials);
        };

        let kind = self
            .authenticator
            .verify_login(
                &command.password,
                &user.credential,
                user.temporary_credential.as_ref(),
            )
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
                other => UserError::Credential(other.to_string()),
            })?;

        match user.status {
            UserStatus::Normal => {}
            UserStatus::Deactivated => return Err(UserError::NotActivated),
            UserStatus::Blocked | UserStatus::Withdrawn => return Err(UserError::Blocked),
        }

        if let (LoginKind::Temporary, Some(temporary)) = (kind, &user.temporary_credential) {
            // Single-use: only the caller that clears this exact credential
            // may log in with it
            if !self
                .repository
                .consume_temporary_credential(&user.id, temporary)
                .await?
            {
                tracing::warn!(user_id = %user.id, "Temporary password already spent or replaced");
                return Err(UserError::InvalidCredentials);
            }
            tracing::info!(user_id = %user.id, "Temporary password consumed");
        }

        let token = self
            .authenticator
            .generate_token(user.id.0)
            .map_err(|e| UserError::TokenIssue(e.to_string()))?;

        tracing::debug!(user_id = %user.id, temporary = kind == LoginKind::Temporary, "User logged in");

        Ok(LoginOutcome {
            user_id: user.id,
            token,
            kind,
        })
    }

    async fn activate(&self, key: &ActivationKey) -> Result<User, UserError> {
        let user = self
            .repository
            .find_by_activation_key(key)
            .await?
            .ok_or(UserError::NotFound(key.to_string()))?;

        let target = Transition::Activate
            .check(user.status)
            .map_err(|_| UserError::NotFound(key.to_string()))?;

        if !self
            .repository
            .transition_status(&user.id, UserStatus::Deactivated, target)
            .await?
        {
            return Err(UserError::NotFound(key.to_string()));
        }

        tracing::info!(user_id = %user.id, "User activated");

        Ok(User {
            status: target,
            activation_key: None,
            ..user
        })
    }

    async fn request_password_reset(&self, login_name: &LoginName) -> Result<(), UserError> {
        let user = self
            .repository
            .find_by_login_name(login_name)
            .await?
            .ok_or(UserError::NotFound(login_name.to_string()))?;

        let temporary = Password::temporary();
        let credential = self.build_credential(&temporary)?;
        self.repository
            .set_temporary_credential(&user.id, &credential)
            .await?;

        self.mailer
            .send_temporary_password(&user, &temporary)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Failed to send temporary password");
                e
            })?;

        tracing::info!(user_id = %user.id, "Temporary password issued");

        Ok(())
    }

    async fn change_password(&self, id: &UserId, password: Password) -> Result<(), UserError> {
        let credential = self.build_credential(&password)?;
        self.repository.update_credential(id, &credential).await?;

        tracing::info!(user_id = %id, "Password changed");

        Ok(())
    }

    async fn withdraw(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;

        tracing::info!(user_id = %id, "User withdrawn");

        Ok(())
    }

    async fn block(&self, id: &UserId, reason: &str) -> Result<User, UserError> {
        let user = self.apply_transition(id, Transition::Block).await?;

        tracing::warn!(user_id = %id, reason = %reason, "User blocked");

        Ok(user)
    }

    async fn unblock(&self, id: &UserId, reason: &str) -> Result<User, UserError> {
        let user = self.apply_transition(id, Transition::Unblock).await?;

        tracing::info!(user_id = %id, reason = %reason, "User unblocked");

        Ok(user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

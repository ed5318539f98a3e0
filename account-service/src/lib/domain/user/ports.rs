use async_trait::async_trait;
use auth::Credential;

use crate::domain::user::models::ActivationKey;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::LoginName;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::SignupCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::status::UserStatus;
use crate::user::errors::MailError;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new account.
    ///
    /// # Arguments
    /// * `command` - Validated login name and password, and whether activation is required
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `LoginNameAlreadyExists` - Login name is already registered
    /// * `Credential` - Password hashing failed
    /// * `Mail` - Activation mail could not be sent
    /// * `DatabaseError` - Database operation failed
    async fn signup(&self, command: SignupCommand) -> Result<User, UserError>;

    /// Verify credentials and issue a bearer token.
    ///
    /// Credentials are verified before the account status is disclosed.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown login name or wrong password
    /// * `NotActivated` - Account still awaits activation
    /// * `Blocked` - Account is blocked
    /// * `TokenIssue` - Token signing failed
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, UserError>;

    /// Redeem an activation key.
    ///
    /// # Returns
    /// Activated user entity
    ///
    /// # Errors
    /// * `NotFound` - Unknown key, or the account is not awaiting activation
    /// * `DatabaseError` - Database operation failed
    async fn activate(&self, key: &ActivationKey) -> Result<User, UserError>;

    /// Store a temporary password and mail its plaintext to the user.
    ///
    /// # Errors
    /// * `NotFound` - No user with this login name
    /// * `Mail` - Mail delivery failed
    /// * `DatabaseError` - Database operation failed
    async fn request_password_reset(&self, login_name: &LoginName) -> Result<(), UserError>;

    /// Replace the primary password and discard any temporary one.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn change_password(&self, id: &UserId, password: Password) -> Result<(), UserError>;

    /// Delete the account. Irreversible.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn withdraw(&self, id: &UserId) -> Result<(), UserError>;

    /// Move a Normal user to Blocked.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `InvalidTransition` - User is not Normal
    /// * `DatabaseError` - Database operation failed
    async fn block(&self, id: &UserId, reason: &str) -> Result<User, UserError>;

    /// Move a Blocked user back to Normal.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `InvalidTransition` - User is not Blocked
    /// * `DatabaseError` - Database operation failed
    async fn unblock(&self, id: &UserId, reason: &str) -> Result<User, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user and assign its identifier.
    ///
    /// # Errors
    /// * `LoginNameAlreadyExists` - Login name is already registered
    /// * `DatabaseError` - Database operation failed
    async fn insert(&self, user: NewUser) -> Result<User, UserError>;

    /// Replace the primary credential and drop any temporary one.
    ///
    /// Only the credential columns are written; status is left to
    /// `transition_status`.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_credential(&self, id: &UserId, credential: &Credential)
        -> Result<(), UserError>;

    /// Store a temporary credential, leaving the primary one untouched.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn set_temporary_credential(
        &self,
        id: &UserId,
        credential: &Credential,
    ) -> Result<(), UserError>;

    /// Clear the temporary credential if it still holds `expected`.
    ///
    /// # Returns
    /// `true` if this call cleared it, `false` if it was already replaced or
    /// cleared
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn consume_temporary_credential(
        &self,
        id: &UserId,
        expected: &Credential,
    ) -> Result<bool, UserError>;

    /// Compare-and-swap the status of a user.
    ///
    /// Clears the activation key when the status leaves `Deactivated`.
    ///
    /// # Returns
    /// `true` if the user was in `from` and now is in `to`, `false` if the
    /// user does not exist or its status was not `from`
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn transition_status(
        &self,
        id: &UserId,
        from: UserStatus,
        to: UserStatus,
    ) -> Result<bool, UserError>;

    /// Remove user from storage, together with everything it owns.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by login name.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_login_name(&self, login_name: &LoginName)
        -> Result<Option<User>, UserError>;

    /// Retrieve the user holding an activation key.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_activation_key(
        &self,
        key: &ActivationKey,
    ) -> Result<Option<User>, UserError>;
}

/// Outbound account mail.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send the activation link for a freshly registered account.
    ///
    /// # Errors
    /// * `InvalidAddress` - Sender or recipient mailbox rejected
    /// * `BuildFailed` - Message could not be assembled
    /// * `DeliveryFailed` - SMTP delivery failed
    async fn send_activation(&self, user: &User, key: &ActivationKey) -> Result<(), MailError>;

    /// Send a temporary password in plaintext.
    ///
    /// # Errors
    /// * `InvalidAddress` - Sender or recipient mailbox rejected
    /// * `BuildFailed` - Message could not be assembled
    /// * `DeliveryFailed` - SMTP delivery failed
    async fn send_temporary_password(
        &self,
        user: &User,
        password: &Password,
    ) -> Result<(), MailError>;
}

use std::fmt;
use std::str::FromStr;

use auth::Credential;
use auth::LoginKind;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::ActivationKeyError;
use crate::user::errors::CodeError;
use crate::user::errors::LoginNameError;
use crate::user::errors::PasswordPolicyError;
use crate::user::status::UserStatus;

/// User aggregate entity.
///
/// Represents a registered account together with its stored credentials.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub login_name: LoginName,
    pub status: UserStatus,
    pub account_type: AccountType,
    pub credential: Credential,
    /// Present only while a password reset is pending
    pub temporary_credential: Option<Credential>,
    /// Present only while the account is deactivated
    pub activation_key: Option<ActivationKey>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.account_type == AccountType::Admin
    }
}

/// User record before the store assigns its identifier.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login_name: LoginName,
    pub status: UserStatus,
    pub account_type: AccountType,
    pub credential: Credential,
    pub activation_key: Option<ActivationKey>,
    pub created_at: DateTime<Utc>,
}

/// User unique identifier type, assigned by the store on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Privilege level. Only set out of band, never by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Admin,
    Normal,
}

impl AccountType {
    pub fn code(self) -> i16 {
        match self {
            AccountType::Admin => -1,
            AccountType::Normal => 0,
        }
    }
}

impl TryFrom<i16> for AccountType {
    type Error = CodeError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(AccountType::Admin),
            0 => Ok(AccountType::Normal),
            other => Err(CodeError::UnknownAccountType(other)),
        }
    }
}

/// Login name value type
///
/// A case-sensitive email address of at most 200 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoginName(String);

impl LoginName {
    const MAX_LENGTH: usize = 200;

    /// Create a new validated login name.
    ///
    /// # Arguments
    /// * `login_name` - Raw email string
    ///
    /// # Returns
    /// Validated LoginName value object
    ///
    /// # Errors
    /// * `TooLong` - Longer than 200 bytes
    /// * `InvalidFormat` - Not a syntactically valid email address
    pub fn new(login_name: String) -> Result<Self, LoginNameError> {
        if login_name.len() > Self::MAX_LENGTH {
            return Err(LoginNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: login_name.len(),
            });
        }

        email_address::EmailAddress::from_str(&login_name)
            .map(|_| LoginName(login_name))
            .map_err(|e| LoginNameError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local part of the address, used to greet the user in mails.
    pub fn display_name(&self) -> &str {
        self.0.split('@').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for LoginName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password accepted by the password policy (1 to 32 bytes).
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MAX_LENGTH: usize = 32;
    const TEMPORARY_LENGTH: usize = 8;

    /// # Errors
    /// * `Empty` - Zero-length password
    /// * `TooLong` - Longer than 32 bytes
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        if password.is_empty() {
            Err(PasswordPolicyError::Empty)
        } else if password.len() > Self::MAX_LENGTH {
            Err(PasswordPolicyError::TooLong {
                max: Self::MAX_LENGTH,
                actual: password.len(),
            })
        } else {
            Ok(Self(password))
        }
    }

    /// Generate a temporary password: the first 8 characters of a random UUID.
    pub fn temporary() -> Self {
        let mut generated = Uuid::new_v4().simple().to_string();
        generated.truncate(Self::TEMPORARY_LENGTH);
        Self(generated)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Single-use activation key mailed at signup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivationKey(pub Uuid);

impl ActivationKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an activation key in its 36-character hyphenated form.
    ///
    /// # Errors
    /// * `InvalidFormat` - Not a hyphenated UUID
    pub fn parse(key: &str) -> Result<Self, ActivationKeyError> {
        if key.len() != 36 {
            return Err(ActivationKeyError::InvalidFormat(format!(
                "expected 36 characters, got {}",
                key.len()
            )));
        }

        Uuid::parse_str(key)
            .map(ActivationKey)
            .map_err(|e| ActivationKeyError::InvalidFormat(e.to_string()))
    }
}

impl Default for ActivationKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActivationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

/// Command to register a new account
#[derive(Debug)]
pub struct SignupCommand {
    pub login_name: LoginName,
    pub password: Password,
    /// Start deactivated and mail an activation key
    pub require_activation: bool,
}

impl SignupCommand {
    pub fn new(login_name: LoginName, password: Password, require_activation: bool) -> Self {
        Self {
            login_name,
            password,
            require_activation,
        }
    }
}

/// Command to log in with a login name and a plaintext password.
///
/// The password is not policy-checked: a password the policy would reject
/// simply fails to match.
pub struct LoginCommand {
    pub login_name: LoginName,
    pub password: String,
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("login_name", &self.login_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user_id: UserId,
    pub token: String,
    pub kind: LoginKind,
}

impl LoginOutcome {
    /// The caller logged in with a temporary password and must set a new one.
    pub fn is_temporary(&self) -> bool {
        self.kind == LoginKind::Temporary
    }
}

use chrono::DateTime;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::TokenService;
use crate::password::Credential;
use crate::password::CredentialStore;
use crate::password::PasswordError;

/// Authentication coordinator combining credential verification and token issuance.
///
/// Owns the login verification policy: the primary credential is tried first
/// and the temporary credential (pending password reset) only as a fallback.
pub struct Authenticator {
    credentials: CredentialStore,
    tokens: TokenService,
}

/// Which stored credential matched a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginKind {
    /// The primary credential matched.
    Permanent,
    /// Only the temporary credential matched; the caller must set a new
    /// permanent password.
    Temporary,
}

/// Result of successful authentication.
#[derive(Debug)]
pub struct AuthenticationResult {
    /// Signed bearer token
    pub access_token: String,
    pub kind: LoginKind,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `credentials` - Credential hashing backend
    /// * `tokens` - Token service holding the signing key pair
    pub fn new(credentials: CredentialStore, tokens: TokenService) -> Self {
        Self {
            credentials,
            tokens,
        }
    }

    /// Build a storable credential for a plaintext password.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<Credential, PasswordError> {
        self.credentials.build_credential(password)
    }

    /// Apply the login verification policy.
    ///
    /// # Arguments
    /// * `password` - Plaintext password submitted by the caller
    /// * `primary` - Stored primary credential
    /// * `temporary` - Stored temporary credential, if a reset is pending
    ///
    /// # Returns
    /// Which credential matched
    ///
    /// # Errors
    /// * `InvalidCredentials` - Neither credential matched
    /// * `PasswordError` - Hashing failed
    pub fn verify_login(
        &self,
        password: &str,
        primary: &Credential,
        temporary: Option<&Credential>,
    ) -> Result<LoginKind, AuthenticationError> {
        if self.credentials.verify(primary, password)? {
            return Ok(LoginKind::Permanent);
        }

        // A failed attempt always costs two hashes, whether or not a reset
        // is pending
        let temporary_matches = match temporary {
            Some(temporary) => self.credentials.verify(temporary, password)?,
            None => {
                self.spend_hash(password);
                false
            }
        };

        if temporary_matches {
            Ok(LoginKind::Temporary)
        } else {
            Err(AuthenticationError::InvalidCredentials)
        }
    }

    /// Spend the same hashing work as a failed `verify_login`, so unknown
    /// accounts are not distinguishable by timing.
    pub fn verify_dummy(&self, password: &str) {
        self.spend_hash(password);
        self.spend_hash(password);
    }

    fn spend_hash(&self, password: &str) {
        let _ = self.credentials.hash(&[0u8; crate::password::SALT_LEN], password);
    }

    /// Verify credentials and issue a token for `user_id`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        user_id: i64,
        password: &str,
        primary: &Credential,
        temporary: Option<&Credential>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let kind = self.verify_login(password, primary, temporary)?;
        let access_token = self.tokens.issue(user_id)?;

        Ok(AuthenticationResult { access_token, kind })
    }

    /// Issue a token without password verification.
    ///
    /// # Errors
    /// * `Signing` - Token generation failed
    pub fn generate_token(&self, user_id: i64) -> Result<String, JwtError> {
        self.tokens.issue(user_id)
    }

    /// Issue a token as if the current time were `now`.
    pub fn generate_token_at(&self, user_id: i64, now: DateTime<Utc>) -> Result<String, JwtError> {
        self.tokens.issue_at(user_id, now)
    }

    /// Validate a bearer token.
    ///
    /// # Errors
    /// * `InvalidToken` - Token validation failed for any reason
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.tokens.validate(token)
    }
}

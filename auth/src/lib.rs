//! Authentication utilities library
//!
//! Provides the credential and token primitives used by the account service:
//! - Salted Argon2id credentials stored as a fixed-size `salt || hash` blob
//! - RS256 bearer tokens carrying only a user id and an expiry
//! - Authentication coordination (primary credential first, temporary fallback)
//!
//! # Examples
//!
//! ## Credentials
//! ```
//! use auth::CredentialStore;
//!
//! let store = CredentialStore::new();
//! let credential = store.build_credential("my_password").unwrap();
//! assert!(store.verify(&credential, "my_password").unwrap());
//! assert!(!store.verify(&credential, "other").unwrap());
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, CredentialStore, LoginKind, TokenService};
//! use chrono::Duration;
//!
//! let tokens = TokenService::from_rsa_pem(
//!     include_bytes!("../testdata/jwt_rsa.pem"),
//!     include_bytes!("../testdata/jwt_rsa.pub.pem"),
//!     Duration::hours(24),
//! )
//! .unwrap();
//! let auth = Authenticator::new(CredentialStore::new(), tokens);
//!
//! // Register: build the stored credential
//! let credential = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue a token
//! let result = auth.authenticate(7, "password123", &credential, None).unwrap();
//! assert_eq!(result.kind, LoginKind::Permanent);
//!
//! // Validate token
//! let claims = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(claims.uid, 7);
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use authenticator::LoginKind;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::TokenService;
pub use jwt::DEFAULT_TOKEN_LIFETIME_HOURS;
pub use password::Credential;
pub use password::CredentialStore;
pub use password::PasswordError;

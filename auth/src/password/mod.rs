pub mod credential;
pub mod errors;

pub use credential::generate_salt;
pub use credential::Credential;
pub use credential::CredentialStore;
pub use credential::CREDENTIAL_LEN;
pub use credential::HASH_LEN;
pub use credential::SALT_LEN;
pub use errors::PasswordError;

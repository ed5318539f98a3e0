use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;
use subtle::ConstantTimeEq;

use super::errors::PasswordError;

/// Length of the random salt that prefixes every stored credential.
pub const SALT_LEN: usize = 16;

/// Length of the hash that follows the salt.
pub const HASH_LEN: usize = 32;

/// Total length of a stored credential (`salt ‖ hash`).
pub const CREDENTIAL_LEN: usize = SALT_LEN + HASH_LEN;

/// Generate `length` bytes of salt from the operating system CSPRNG.
pub fn generate_salt(length: usize) -> Vec<u8> {
    let mut salt = vec![0u8; length];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Stored password credential: a fixed-length salt followed by the salted hash.
///
/// The raw bytes are what persistence stores verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Vec<u8>);

impl Credential {
    /// Wrap bytes loaded from storage.
    ///
    /// # Errors
    /// * `MalformedCredential` - Byte length is not `CREDENTIAL_LEN`
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PasswordError> {
        if bytes.len() != CREDENTIAL_LEN {
            return Err(PasswordError::MalformedCredential {
                expected: CREDENTIAL_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    fn salt(&self) -> &[u8] {
        &self.0[..SALT_LEN]
    }

    fn digest(&self) -> &[u8] {
        &self.0[SALT_LEN..]
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Salted password hashing and verification.
///
/// Hashes are raw Argon2id output keyed by a per-credential salt, so the same
/// salt and plaintext always give the same bytes while different salts give
/// unrelated bytes for identical passwords.
#[derive(Clone)]
pub struct CredentialStore {
    argon2: Argon2<'static>,
}

impl CredentialStore {
    /// Create a credential store with the default Argon2id cost parameters.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }

    /// Create a credential store with explicit Argon2id cost parameters.
    ///
    /// # Arguments
    /// * `m_cost` - Memory size in KiB
    /// * `t_cost` - Number of iterations
    /// * `p_cost` - Degree of parallelism
    ///
    /// # Errors
    /// * `InvalidParameters` - Argon2 rejected the combination
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordError> {
        let params = Params::new(m_cost, t_cost, p_cost, Some(HASH_LEN))
            .map_err(|e| PasswordError::InvalidParameters(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash `plaintext` under `salt`.
    ///
    /// # Errors
    /// * `HashingFailed` - Salt too short or hashing failed
    pub fn hash(&self, salt: &[u8], plaintext: &str) -> Result<[u8; HASH_LEN], PasswordError> {
        let mut output = [0u8; HASH_LEN];
        self.argon2
            .hash_password_into(plaintext.as_bytes(), salt, &mut output)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
        Ok(output)
    }

    /// Build a storable credential from a plaintext password using a fresh salt.
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing failed
    pub fn build_credential(&self, plaintext: &str) -> Result<Credential, PasswordError> {
        let mut bytes = generate_salt(SALT_LEN);
        let digest = self.hash(&bytes, plaintext)?;
        bytes.extend_from_slice(&digest);
        Ok(Credential(bytes))
    }

    /// Check a plaintext password against a stored credential.
    ///
    /// The comparison runs in constant time with respect to the digest bytes.
    ///
    /// # Returns
    /// True if the password matches, false otherwise
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing failed
    pub fn verify(&self, stored: &Credential, plaintext: &str) -> Result<bool, PasswordError> {
        let candidate = self.hash(stored.salt(), plaintext)?;
        Ok(bool::from(candidate[..].ct_eq(stored.digest())))
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

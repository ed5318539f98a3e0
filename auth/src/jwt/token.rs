use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// Lifetime applied to issued tokens unless configured otherwise.
pub const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;

/// Issues and validates RS256-signed bearer tokens.
///
/// Tokens carry only the subject user id and an expiry. They are not
/// renewable and there is no revocation list: a token stays valid until it
/// expires, whatever happens to the account in between.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    /// Create a token service from a PEM encoded RSA key pair.
    ///
    /// # Arguments
    /// * `private_pem` - PKCS#1 or PKCS#8 private key used for signing
    /// * `public_pem` - SubjectPublicKeyInfo public key used for validation
    /// * `lifetime` - Validity period of issued tokens
    ///
    /// # Errors
    /// * `InvalidKey` - Either key could not be parsed
    pub fn from_rsa_pem(
        private_pem: &[u8],
        public_pem: &[u8],
        lifetime: Duration,
    ) -> Result<Self, JwtError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| JwtError::InvalidKey(format!("private key: {}", e)))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem)
            .map_err(|e| JwtError::InvalidKey(format!("public key: {}", e)))?;

        Ok(Self {
            encoding_key,
            decoding_key,
            lifetime,
        })
    }

    /// Issue a token for `user_id`, valid from now for the configured lifetime.
    ///
    /// # Errors
    /// * `Signing` - Token signing failed
    pub fn issue(&self, user_id: i64) -> Result<String, JwtError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, user_id: i64, now: DateTime<Utc>) -> Result<String, JwtError> {
        let claims = Claims::for_user(user_id, now, self.lifetime);

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Signing(e.to_string()))
    }

    /// Validate a token against the current time.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed, wrongly signed, tampered or expired
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`.
    ///
    /// Expiry is checked here rather than by `jsonwebtoken` so that the
    /// boundary is exact (no leeway) and the clock can be supplied.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| JwtError::InvalidToken)?
            .claims;

        if claims.is_expired(now.timestamp()) {
            return Err(JwtError::InvalidToken);
        }

        Ok(claims)
    }
}

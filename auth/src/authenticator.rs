use std::sync::OnceLock;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::TokenCodec;
use crate::jwt::TokenError;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Plaintext behind the hash that unknown usernames are checked against.
const DECOY_PASSWORD: &str = "decoy-password-never-assigned";

/// Authentication coordinator combining password verification and token issuance.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
    decoy_hash: OnceLock<String>,
}

/// Result of successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// Signed session token
    pub access_token: String,

    /// Moment the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl Authenticator {
    /// Create a new authenticator around an already configured codec.
    pub fn new(token_codec: TokenCodec) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_codec,
            decoy_hash: OnceLock::new(),
        }
    }

    /// Lifetime of the tokens this authenticator issues.
    pub fn token_ttl(&self) -> Duration {
        self.token_codec.ttl()
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against a stored hash.
    ///
    /// With no stored hash (unknown account) the password is still run through a
    /// full Argon2 verification against a decoy hash, so both failure paths cost
    /// the same. The result is then always `false`.
    pub fn verify_password(&self, password: &str, stored_hash: Option<&str>) -> bool {
        match stored_hash {
            Some(stored_hash) => self.password_hasher.verify(password, stored_hash),
            None => {
                let _ = self.password_hasher.verify(password, self.decoy_hash());
                false
            }
        }
    }

    fn decoy_hash(&self) -> &str {
        self.decoy_hash.get_or_init(|| {
            self.password_hasher
                .hash(DECOY_PASSWORD)
                .unwrap_or_default()
        })
    }

    /// Issue a token without password verification.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    /// * `InvalidLifetime` - Expiry falls outside the representable time range
    pub fn issue_token(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthenticationResult, TokenError> {
        let expires_at = now
            .checked_add_signed(self.token_codec.ttl())
            .ok_or(TokenError::InvalidLifetime)?;
        let access_token = self.token_codec.issue(subject, now)?;

        Ok(AuthenticationResult {
            access_token,
            expires_at,
        })
    }

    /// Verify a token's signature and reject it if expired at `now`.
    ///
    /// # Errors
    /// * `Malformed`, `SignatureInvalid`, `InvalidClaims` - See [`TokenCodec::parse`]
    /// * `Expired` - Token lifetime is over
    pub fn validate_token(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = self.token_codec.parse(token)?;

        if claims.is_expired(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;

/// Issues and parses compact HS256 session tokens.
///
/// The codec is built once at startup and shared read-only between requests.
/// Parsing always recomputes the HMAC over `header.payload`; expiry is a separate
/// check (see [`Claims::is_expired`]).
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    /// Minimum secret length for HS256 (256 bits).
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Longest accepted token lifetime: ten years.
    pub const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

    /// Create a codec signing with `secret` and issuing tokens valid for `ttl`.
    ///
    /// # Errors
    /// * `WeakSecret` - Secret is shorter than 32 bytes
    /// * `InvalidLifetime` - `ttl` is shorter than one second or longer than
    ///   [`Self::MAX_TTL_SECONDS`]
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, TokenError> {
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(TokenError::WeakSecret {
                min: Self::MIN_SECRET_LENGTH,
                actual: secret.len(),
            });
        }
        if ttl < Duration::seconds(1) || ttl > Duration::seconds(Self::MAX_TTL_SECONDS) {
            return Err(TokenError::InvalidLifetime);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Claim presence is enforced by `Claims` deserialization, expiry by the caller.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    /// Lifetime applied to every issued token.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject`, valid from `now` until `now + ttl`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(subject, now, self.ttl);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify the signature of `token` and decode its claims.
    ///
    /// Expired tokens still parse successfully.
    ///
    /// # Errors
    /// * `SignatureInvalid` - Signature does not match the payload
    /// * `InvalidClaims` - Signature matches but the payload is not a valid claim set
    /// * `Malformed` - Anything else (wrong part count, bad base64, unexpected algorithm)
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                ErrorKind::Json(_) => TokenError::InvalidClaims(e.to_string()),
                _ => TokenError::Malformed(e.to_string()),
            })
    }
}

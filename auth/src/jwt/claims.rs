use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Session token claims.
///
/// The subject is the account's username; `iat` and `exp` are Unix timestamps in seconds.
/// All three are mandatory, a payload missing any of them does not deserialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims for `subject` issued at `now` and valid for `ttl`.
    pub fn new(subject: impl ToString, now: DateTime<Utc>, ttl: Duration) -> Self {
        let issued_at = now.timestamp();

        Self {
            sub: subject.to_string(),
            iat: issued_at,
            exp: issued_at + ttl.num_seconds(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Expiration as a timestamp, `None` if `exp` is out of chrono's range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// A token is expired from the `exp` second onwards.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::TokenRejection;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::user::models::Principal;
use crate::domain::user::models::User;

/// Port for authentication operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Check a username/password pair and issue a session token.
    ///
    /// # Errors
    /// * `AuthenticationFailed` - Unknown user, wrong password or inactive account
    /// * `Internal` - Lookup or token issuance failed
    async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError>;

    /// Create a new account with a hashed password.
    ///
    /// # Errors
    /// * `Conflict` - Username or email already taken (pre-check or storage constraint)
    /// * `Internal` - Hashing or storage failed
    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError>;

    /// Resolve a raw bearer token into the principal it currently stands for.
    ///
    /// # Errors
    /// Every failure is a [`TokenRejection`]; callers treat all of them as anonymous.
    async fn resolve_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Principal, TokenRejection>;
}

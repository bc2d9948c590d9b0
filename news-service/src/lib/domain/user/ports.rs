use async_trait::async_trait;

use crate::domain::user::models::Credential;
use crate::domain::user::models::Principal;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve user by unique username.
    ///
    /// # Errors
    /// * `NotFoundByUsername` - No user with this username
    /// * `DatabaseError` - Database operation failed
    async fn get_user_by_username(&self, username: &str) -> Result<User, UserError>;

    /// Re-enable a deactivated account.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn activate_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Disable an account. It can no longer log in and its outstanding tokens stop
    /// resolving.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn deactivate_user(&self, id: &UserId) -> Result<User, UserError>;
}

/// Read-only account lookups the authentication core depends on.
#[async_trait]
pub trait PrincipalStore: Send + Sync + 'static {
    /// Stored credential for `username`, `None` if no such account.
    async fn find_credential(&self, username: &str) -> Result<Option<Credential>, UserError>;

    /// Current identity and role for `username`, `None` if no such account.
    async fn find_principal(&self, username: &str) -> Result<Option<Principal>, UserError>;

    /// Whether an account already uses `username`.
    async fn exists_by_username(&self, username: &str) -> Result<bool, UserError>;

    /// Whether an account already uses `email`.
    async fn exists_by_email(&self, email: &str) -> Result<bool, UserError>;
}

/// Persistence operations for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username unique constraint violated
    /// * `EmailAlreadyExists` - Email unique constraint violated
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError>;

    /// Set the `active` flag and return the updated account.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn set_active(&self, id: &UserId, active: bool) -> Result<User, UserError>;
}

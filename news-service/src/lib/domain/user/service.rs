use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>) -> Self {
        Self { repository }
    }

    async fn set_active(&self, id: &UserId, active: bool) -> Result<User, UserError> {
        let user = self.repository.set_active(id, active).await?;

        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            active,
            "Account status changed"
        );

        Ok(user)
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, UserError> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or(UserError::NotFoundByUsername(username.to_string()))
    }

    async fn activate_user(&self, id: &UserId) -> Result<User, UserError> {
        self.set_active(id, true).await
    }

    async fn deactivate_user(&self, id: &UserId) -> Result<User, UserError> {
        self.set_active(id, false).await
    }
}

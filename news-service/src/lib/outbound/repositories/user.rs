use async_trait::async_trait;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::Credential;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Principal;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::PrincipalStore;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// PostgreSQL implementation of the account store.
///
/// Serves both the persistence port used by the user service and the read-only
/// lookups the authentication core depends on.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    active: bool,
    biography: Option<String>,
    profile_image_url: Option<String>,
    gender: Option<String>,
    birth_date: Option<NaiveDate>,
    registered_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(r.id),
            username: Username::new(r.username)?,
            email: EmailAddress::new(r.email)?,
            name: r.name,
            password_hash: r.password_hash,
            role: r.role.parse()?,
            active: r.active,
            biography: r.biography,
            profile_image_url: r.profile_image_url,
            gender: r.gender,
            birth_date: r.birth_date,
            registered_at: r.registered_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, name, password_hash, role, active,
                biography, profile_image_url, gender, birth_date, registered_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.active)
        .bind(&user.biography)
        .bind(&user.profile_image_url)
        .bind(&user.gender)
        .bind(user.birth_date)
        .bind(user.registered_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    if db_err.constraint() == Some("users_username_key") {
                        return UserError::UsernameAlreadyExists(
                            user.username.as_str().to_string(),
                        );
                    }
                    if db_err.constraint() == Some("users_email_key") {
                        return UserError::EmailAlreadyExists(user.email.as_str().to_string());
                    }
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, name, password_hash, role, active,
                   biography, profile_image_url, gender, birth_date, registered_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, name, password_hash, role, active,
                   biography, profile_image_url, gender, birth_date, registered_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?
        .map(User::try_from)
        .transpose()
    }

    async fn set_active(&self, id: &UserId, active: bool) -> Result<User, UserError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET active = $2
            WHERE id = $1
            RETURNING id, username, email, name, password_hash, role, active,
                      biography, profile_image_url, gender, birth_date, registered_at
            "#,
        )
        .bind(id.0)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?
        .ok_or(UserError::NotFound(id.to_string()))
        .and_then(User::try_from)
    }
}

#[async_trait]
impl PrincipalStore for PostgresUserRepository {
    async fn find_credential(&self, username: &str) -> Result<Option<Credential>, UserError> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT username, password_hash FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(row.map(|(username, password_hash)| Credential {
            username,
            password_hash,
        }))
    }

    async fn find_principal(&self, username: &str) -> Result<Option<Principal>, UserError> {
        let row: Option<(Uuid, String, String, bool)> =
            sqlx::query_as("SELECT id, username, role, active FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(|(id, username, role, active)| {
            Ok::<_, UserError>(Principal {
                id: UserId(id),
                username,
                role: role.parse()?,
                active,
            })
        })
        .transpose()
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, UserError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, UserError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::TokenRejection;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::Principal;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::ports::PrincipalStore;
use crate::user::ports::UserRepository;

/// Stateless authentication service.
///
/// Holds no per-session state: a login only produces a signed token, and every later
/// request is resolved from that token plus a fresh principal lookup.
pub struct AuthService<S>
where
    S: PrincipalStore + UserRepository,
{
    store: Arc<S>,
    authenticator: Arc<Authenticator>,
}

impl<S> AuthService<S>
where
    S: PrincipalStore + UserRepository,
{
    pub fn new(store: Arc<S>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            store,
            authenticator,
        }
    }

    /// Argon2 is CPU-bound, keep it off the async workers.
    ///
    /// `None` (unknown account) still pays for one full verification.
    async fn verify_password(
        &self,
        password: &str,
        password_hash: Option<String>,
    ) -> Result<bool, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();

        tokio::task::spawn_blocking(move || {
            authenticator.verify_password(&password, password_hash.as_deref())
        })
        .await
            .map_err(|e| AuthError::Internal(format!("Password verification task failed: {}", e)))
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

#[async_trait]
impl<S> AuthServicePort for AuthService<S>
where
    S: PrincipalStore + UserRepository,
{
    async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let credential = self.store.find_credential(username).await?;
        let password_hash = credential.as_ref().map(|c| c.password_hash.clone());
        let verified = self.verify_password(password, password_hash).await?;

        let credential = match credential {
            Some(credential) if verified => credential,
            Some(_) => {
                tracing::info!(username, reason = "password mismatch", "Login rejected");
                return Err(AuthError::AuthenticationFailed);
            }
            None => {
                tracing::info!(username, reason = "unknown username", "Login rejected");
                return Err(AuthError::AuthenticationFailed);
            }
        };

        let principal = match self.store.find_principal(&credential.username).await? {
            Some(principal) if principal.active => principal,
            Some(_) => {
                tracing::info!(username, reason = "inactive account", "Login rejected");
                return Err(AuthError::AuthenticationFailed);
            }
            None => {
                tracing::info!(username, reason = "account vanished", "Login rejected");
                return Err(AuthError::AuthenticationFailed);
            }
        };

        let session = self
            .authenticator
            .issue_token(&principal.username, Utc::now())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(
            user_id = %principal.id,
            username = %principal.username,
            role = %principal.role,
            expires_at = %session.expires_at,
            "Login succeeded"
        );

        Ok(LoginOutcome {
            principal,
            token: session.access_token,
            expires_at: session.expires_at,
        })
    }

    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError> {
        // Friendly pre-check; the storage unique constraints remain authoritative.
        if self
            .store
            .exists_by_username(command.username.as_str())
            .await?
        {
            return Err(AuthError::username_taken(command.username.as_str()));
        }
        if self.store.exists_by_email(command.email.as_str()).await? {
            return Err(AuthError::email_taken(command.email.as_str()));
        }

        let password_hash = self.hash_password(command.password).await?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            name: command.name,
            password_hash,
            role: command.role,
            active: true,
            biography: command.biography,
            profile_image_url: command.profile_image_url,
            gender: command.gender,
            birth_date: command.birth_date,
            registered_at: Utc::now(),
        };

        // A concurrent registration may win between the pre-check and this write; the
        // constraint violation converts into the same Conflict.
        let created = self.store.create(user).await?;

        tracing::info!(
            user_id = %created.id,
            username = %created.username,
            role = %created.role,
            "User registered"
        );

        Ok(created)
    }

    async fn resolve_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Principal, TokenRejection> {
        let claims = self.authenticator.validate_token(token, now)?;

        match self.store.find_principal(claims.subject()).await {
            Ok(Some(principal)) if principal.active => Ok(principal),
            Ok(Some(_)) => Err(TokenRejection::InactiveAccount),
            Ok(None) => Err(TokenRejection::UnknownSubject),
            Err(e) => Err(TokenRejection::LookupFailed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use auth::TokenCodec;
    use chrono::Duration;
    use mockall::mock;

    use super::*;
    use crate::domain::auth::errors::ConflictField;
    use crate::domain::user::models::Credential;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Role;
    use crate::domain::user::models::Username;
    use crate::user::errors::UserError;

    mock! {
        pub TestUserStore {}

        #[async_trait]
        impl PrincipalStore for TestUserStore {
            async fn find_credential(&self, username: &str) -> Result<Option<Credential>, UserError>;
            async fn find_principal(&self, username: &str) -> Result<Option<Principal>, UserError>;
            async fn exists_by_username(&self, username: &str) -> Result<bool, UserError>;
            async fn exists_by_email(&self, email: &str) -> Result<bool, UserError>;
        }

        #[async_trait]
        impl UserRepository for TestUserStore {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError>;
            async fn set_active(&self, id: &UserId, active: bool) -> Result<User, UserError>;
        }
    }

    const TOKEN_TTL_SECONDS: i64 = 3600;

    fn authenticator() -> Arc<Authenticator> {
        let codec = TokenCodec::new(
            b"test-secret-key-for-jwt-signing-at-least-32-bytes",
            Duration::seconds(TOKEN_TTL_SECONDS),
        )
        .expect("Failed to build codec");
        Arc::new(Authenticator::new(codec))
    }

    fn principal(username: &str, role: Role, active: bool) -> Principal {
        Principal {
            id: UserId::new(),
            username: username.to_string(),
            role,
            active,
        }
    }

    fn register_command(username: &str, email: &str) -> RegisterCommand {
        RegisterCommand {
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password: "password123".to_string(),
            name: "Test User".to_string(),
            role: Role::Journalist,
            biography: None,
            profile_image_url: None,
            gender: None,
            birth_date: None,
        }
    }

    /// Store holding a single account `alice` / `password123`.
    fn store_with_alice(authenticator: &Authenticator, active: bool) -> MockTestUserStore {
        let password_hash = authenticator.hash_password("password123").unwrap();
        let alice = principal("alice", Role::User, active);

        let mut store = MockTestUserStore::new();
        store
            .expect_find_credential()
            .returning(move |username| {
                Ok((username == "alice").then(|| Credential {
                    username: "alice".to_string(),
                    password_hash: password_hash.clone(),
                }))
            });
        store
            .expect_find_principal()
            .returning(move |username| Ok((username == "alice").then(|| alice.clone())));
        store
    }

    #[tokio::test]
    async fn test_login_success() {
        let authenticator = authenticator();
        let store = store_with_alice(&authenticator, true);
        let service = AuthService::new(Arc::new(store), Arc::clone(&authenticator));

        let outcome = service.login("alice", "password123").await.unwrap();

        assert_eq!(outcome.principal.username, "alice");
        let claims = authenticator
            .validate_token(&outcome.token, Utc::now())
            .expect("Issued token must validate");
        assert_eq!(claims.subject(), "alice");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECONDS);
    }

    #[tokio::test]
    async fn test_login_unknown_user_and_wrong_password_are_indistinguishable() {
        let authenticator = authenticator();
        let store = store_with_alice(&authenticator, true);
        let service = AuthService::new(Arc::new(store), authenticator);

        let unknown = service.login("mallory", "password123").await.unwrap_err();
        let wrong_password = service.login("alice", "wrong-password").await.unwrap_err();

        assert!(matches!(unknown, AuthError::AuthenticationFailed));
        assert!(matches!(wrong_password, AuthError::AuthenticationFailed));
        assert_eq!(unknown.to_string(), wrong_password.to_string());
    }

    #[tokio::test]
    async fn test_login_unknown_user_costs_a_password_verification() {
        let authenticator = authenticator();
        let store = store_with_alice(&authenticator, true);
        let service = AuthService::new(Arc::new(store), authenticator);

        // Warm up the lazily built decoy hash.
        let _ = service.login("mallory", "password123").await;

        let started = Instant::now();
        let _ = service.login("alice", "wrong-password").await;
        let wrong_password = started.elapsed();

        let started = Instant::now();
        let _ = service.login("mallory", "password123").await;
        let unknown = started.elapsed();

        assert!(
            unknown * 4 >= wrong_password,
            "unknown user took {:?}, wrong password took {:?}",
            unknown,
            wrong_password
        );
    }

    #[tokio::test]
    async fn test_login_inactive_account() {
        let authenticator = authenticator();
        let store = store_with_alice(&authenticator, false);
        let service = AuthService::new(Arc::new(store), authenticator);

        let result = service.login("alice", "password123").await;
        assert!(matches!(result, Err(AuthError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn test_login_store_failure_is_internal() {
        let mut store = MockTestUserStore::new();
        store
            .expect_find_credential()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("connection reset".to_string())));

        let service = AuthService::new(Arc::new(store), authenticator());

        let result = service.login("alice", "password123").await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut store = MockTestUserStore::new();
        store.expect_exists_by_username().returning(|_| Ok(false));
        store.expect_exists_by_email().returning(|_| Ok(false));
        store
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "reporter"
                    && user.password_hash.starts_with("$argon2")
                    && user.password_hash != "password123"
                    && user.active
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = AuthService::new(Arc::new(store), authenticator());

        let user = service
            .register(register_command("reporter", "reporter@example.com"))
            .await
            .unwrap();

        assert_eq!(user.username.as_str(), "reporter");
        assert_eq!(user.role, Role::Journalist);
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let mut store = MockTestUserStore::new();
        store.expect_exists_by_username().returning(|_| Ok(true));
        store.expect_exists_by_email().returning(|_| Ok(false));
        store.expect_create().times(0);

        let service = AuthService::new(Arc::new(store), authenticator());

        let result = service
            .register(register_command("reporter", "reporter@example.com"))
            .await;

        assert!(matches!(
            result,
            Err(AuthError::Conflict {
                field: ConflictField::Username,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut store = MockTestUserStore::new();
        store.expect_exists_by_username().returning(|_| Ok(false));
        store.expect_exists_by_email().returning(|_| Ok(true));
        store.expect_create().times(0);

        let service = AuthService::new(Arc::new(store), authenticator());

        let result = service
            .register(register_command("reporter", "reporter@example.com"))
            .await;

        assert!(matches!(
            result,
            Err(AuthError::Conflict {
                field: ConflictField::Email,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_register_lost_race_is_conflict() {
        let mut store = MockTestUserStore::new();
        store.expect_exists_by_username().returning(|_| Ok(false));
        store.expect_exists_by_email().returning(|_| Ok(false));
        store.expect_create().times(1).returning(|user| {
            Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ))
        });

        let service = AuthService::new(Arc::new(store), authenticator());

        let result = service
            .register(register_command("reporter", "reporter@example.com"))
            .await;

        assert!(matches!(
            result,
            Err(AuthError::Conflict {
                field: ConflictField::Username,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_resolve_token_valid_until_expiry() {
        let authenticator = authenticator();
        let mut store = MockTestUserStore::new();
        let alice = principal("alice", Role::User, true);
        let expected = alice.clone();
        store
            .expect_find_principal()
            .returning(move |_| Ok(Some(alice.clone())));

        let service = AuthService::new(Arc::new(store), Arc::clone(&authenticator));

        let issued_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let token = authenticator
            .issue_token("alice", issued_at)
            .unwrap()
            .access_token;

        let last_valid = issued_at + Duration::seconds(TOKEN_TTL_SECONDS - 1);
        assert_eq!(service.resolve_token(&token, last_valid).await, Ok(expected));

        let expiry = issued_at + Duration::seconds(TOKEN_TTL_SECONDS);
        assert_eq!(
            service.resolve_token(&token, expiry).await,
            Err(TokenRejection::Expired)
        );
    }

    #[tokio::test]
    async fn test_resolve_token_rejects_stale_accounts() {
        let authenticator = authenticator();
        let mut store = MockTestUserStore::new();
        let disabled = principal("disabled", Role::Admin, false);
        store.expect_find_principal().returning(move |username| {
            Ok((username == "disabled").then(|| disabled.clone()))
        });

        let service = AuthService::new(Arc::new(store), Arc::clone(&authenticator));
        let now = Utc::now();

        let deleted_token = authenticator.issue_token("deleted", now).unwrap().access_token;
        assert_eq!(
            service.resolve_token(&deleted_token, now).await,
            Err(TokenRejection::UnknownSubject)
        );

        let disabled_token = authenticator.issue_token("disabled", now).unwrap().access_token;
        assert_eq!(
            service.resolve_token(&disabled_token, now).await,
            Err(TokenRejection::InactiveAccount)
        );
    }

    #[tokio::test]
    async fn test_resolve_token_rejects_invalid_tokens() {
        let authenticator = authenticator();
        let mut store = MockTestUserStore::new();
        store.expect_find_principal().times(0);

        let service = AuthService::new(Arc::new(store), Arc::clone(&authenticator));
        let now = Utc::now();

        assert_eq!(
            service.resolve_token("not-a-token", now).await,
            Err(TokenRejection::Malformed)
        );

        let foreign = TokenCodec::new(
            b"some-other-secret-that-is-32-bytes-long",
            Duration::seconds(TOKEN_TTL_SECONDS),
        )
        .unwrap()
        .issue("alice", now)
        .unwrap();
        assert_eq!(
            service.resolve_token(&foreign, now).await,
            Err(TokenRejection::SignatureInvalid)
        );
    }
}

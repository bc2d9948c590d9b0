use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenCodec;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use news_service::domain::access::RoutePolicy;
use news_service::domain::auth::service::AuthService;
use news_service::domain::user::models::Credential;
use news_service::domain::user::models::EmailAddress;
use news_service::domain::user::models::Principal;
use news_service::domain::user::models::Role;
use news_service::domain::user::models::User;
use news_service::domain::user::models::UserId;
use news_service::domain::user::models::Username;
use news_service::domain::user::ports::PrincipalStore;
use news_service::domain::user::ports::UserRepository;
use news_service::domain::user::service::UserService;
use news_service::inbound::http::router::create_router;
use news_service::user::errors::UserError;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const TOKEN_TTL_SECONDS: i64 = 3600;

/// Account store kept in memory, enforcing the same uniqueness rules as the
/// `users` table.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    fn find(&self, predicate: impl Fn(&User) -> bool) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|user| predicate(*user))
            .cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();

        if users.values().any(|u| u.username == user.username) {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.as_str().to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        Ok(self.find(|user| user.username.as_str() == username))
    }

    async fn set_active(&self, id: &UserId, active: bool) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(id)
            .ok_or(UserError::NotFound(id.to_string()))?;
        user.active = active;
        Ok(user.clone())
    }
}

#[async_trait]
impl PrincipalStore for InMemoryUserStore {
    async fn find_credential(&self, username: &str) -> Result<Option<Credential>, UserError> {
        Ok(self
            .find(|user| user.username.as_str() == username)
            .map(|user| user.credential()))
    }

    async fn find_principal(&self, username: &str) -> Result<Option<Principal>, UserError> {
        Ok(self
            .find(|user| user.username.as_str() == username)
            .map(|user| user.principal()))
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, UserError> {
        Ok(self.find(|user| user.username.as_str() == username).is_some())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, UserError> {
        Ok(self.find(|user| user.email.as_str() == email).is_some())
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<InMemoryUserStore>,
    pub authenticator: Arc<Authenticator>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(InMemoryUserStore::default());
        let token_codec = TokenCodec::new(TEST_SECRET, Duration::seconds(TOKEN_TTL_SECONDS))
            .expect("Failed to create token codec");
        let authenticator = Arc::new(Authenticator::new(token_codec));

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&store),
            Arc::clone(&authenticator),
        ));
        let user_service = Arc::new(UserService::new(Arc::clone(&store)));

        let router = create_router(
            auth_service,
            user_service,
            Arc::new(RoutePolicy::news_defaults()),
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            store,
            authenticator,
            api_client: reqwest::Client::new(),
        }
    }

    /// Insert an account directly into the store, bypassing registration.
    pub async fn seed_user(&self, username: &str, password: &str, role: Role) -> User {
        let user = User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(format!("{}@example.com", username)).unwrap(),
            name: format!("{} Test", username),
            password_hash: self.authenticator.hash_password(password).unwrap(),
            role,
            active: true,
            biography: None,
            profile_image_url: None,
            gender: None,
            birth_date: None,
            registered_at: Utc::now(),
        };

        self.store.create(user).await.unwrap()
    }

    /// Mint a token for `username` as if issued at `issued_at`.
    pub fn token_issued_at(&self, username: &str, issued_at: DateTime<Utc>) -> String {
        self.authenticator
            .issue_token(username, issued_at)
            .unwrap()
            .access_token
    }

    /// Log in through the API and return the bearer token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let body: serde_json::Value = self
            .post("/api/auth/login")
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse response");

        body["token"]
            .as_str()
            .expect("Login response carries no token")
            .to_string()
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .put(&format!("{}{}", self.address, path))
            .bearer_auth(token)
    }
}

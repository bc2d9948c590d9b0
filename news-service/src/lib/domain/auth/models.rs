use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Principal;
use crate::domain::user::models::Role;
use crate::domain::user::models::Username;

/// Per-request authentication state.
///
/// Built by the request gate for every inbound request and dropped with it. An empty
/// context means the request is anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    principal: Option<Principal>,
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        Self { principal: None }
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.principal.is_none()
    }
}

/// Successful login: the resolved principal and its freshly issued token.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub principal: Principal,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Validated registration request.
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub email: EmailAddress,
    /// Plain text password (hashed by the service)
    pub password: String,
    pub name: String,
    pub role: Role,
    pub biography: Option<String>,
    pub profile_image_url: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

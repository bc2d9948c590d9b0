use std::fmt;

use thiserror::Error;

use crate::user::errors::UserError;

/// Unique account field a registration collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Username,
    Email,
}

impl ConflictField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictField::Username => "username",
            ConflictField::Email => "email",
        }
    }
}

impl fmt::Display for ConflictField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by login and registration.
///
/// Login failures are deliberately collapsed into `AuthenticationFailed`: unknown
/// usernames, wrong passwords and disabled accounts look the same to the caller.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    AuthenticationFailed,

    #[error("{message}")]
    Conflict {
        field: ConflictField,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn username_taken(username: &str) -> Self {
        AuthError::Conflict {
            field: ConflictField::Username,
            message: format!("Username already in use: {}", username),
        }
    }

    pub fn email_taken(email: &str) -> Self {
        AuthError::Conflict {
            field: ConflictField::Email,
            message: format!("Email already in use: {}", email),
        }
    }
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::UsernameAlreadyExists(username) => AuthError::username_taken(&username),
            UserError::EmailAlreadyExists(email) => AuthError::email_taken(&email),
            other => AuthError::Internal(other.to_string()),
        }
    }
}

/// Why a presented bearer token did not yield a principal.
///
/// Only used for logging; every variant resolves the request as anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenRejection {
    #[error("malformed token")]
    Malformed,

    #[error("signature mismatch")]
    SignatureInvalid,

    #[error("token expired")]
    Expired,

    #[error("subject no longer exists")]
    UnknownSubject,

    #[error("account is inactive")]
    InactiveAccount,

    #[error("principal lookup failed: {0}")]
    LookupFailed(String),
}

impl From<auth::TokenError> for TokenRejection {
    fn from(err: auth::TokenError) -> Self {
        match err {
            auth::TokenError::SignatureInvalid => TokenRejection::SignatureInvalid,
            auth::TokenError::Expired => TokenRejection::Expired,
            _ => TokenRejection::Malformed,
        }
    }
}

//! Authentication utilities library
//!
//! Stateless authentication building blocks for the news backend:
//! - Password hashing (Argon2id)
//! - Signed session tokens (HS256 JWT) with a fixed lifetime
//! - Authentication coordination
//!
//! Services define their own account storage and adapt these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Tokens
//! ```
//! use auth::TokenCodec;
//! use chrono::{Duration, Utc};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24)).unwrap();
//! let now = Utc::now();
//! let token = codec.issue("alice", now).unwrap();
//! let claims = codec.parse(&token).unwrap();
//! assert_eq!(claims.subject(), "alice");
//! assert!(!claims.is_expired(now));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, TokenCodec};
//! use chrono::{Duration, Utc};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24)).unwrap();
//! let auth = Authenticator::new(codec);
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify, then issue a token
//! assert!(auth.verify_password("password123", Some(&hash)));
//! let result = auth.issue_token("alice", Utc::now()).unwrap();
//!
//! // Unknown accounts still pay for a verification and never match
//! assert!(!auth.verify_password("password123", None));
//!
//! // Later requests: validate token
//! let claims = auth.validate_token(&result.access_token, Utc::now()).unwrap();
//! assert_eq!(claims.subject(), "alice");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::TokenCodec;
pub use jwt::TokenError;
pub use password::PasswordError;
pub use password::PasswordHasher;

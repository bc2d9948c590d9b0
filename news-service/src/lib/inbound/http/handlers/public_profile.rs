use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

pub async fn public_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<ApiSuccess<PublicProfileData>, ApiError> {
    state
        .user_service
        .get_user_by_username(&username)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

/// Publicly visible part of an account (author pages).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicProfileData {
    pub id: String,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub biography: Option<String>,
    pub profile_image_url: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl From<&User> for PublicProfileData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            name: user.name.clone(),
            role: user.role,
            biography: user.biography.clone(),
            profile_image_url: user.profile_image_url.clone(),
            registered_at: user.registered_at,
        }
    }
}

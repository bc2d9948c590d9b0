use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::Role;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let Json(body) = body?;

    let outcome = state
        .auth_service
        .login(&body.username, &body.password)
        .await?;

    // An account removed between authentication and this lookup fails like any
    // other bad login.
    let user = state
        .user_service
        .get_user(&outcome.principal.id)
        .await
        .map_err(|e| match e {
            UserError::NotFound(_) => ApiError::from(AuthError::AuthenticationFailed),
            other => ApiError::from(other),
        })?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData {
            token: outcome.token,
            token_type: "Bearer".to_string(),
            expires_at: outcome.expires_at,
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            name: user.name,
            role: user.role,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

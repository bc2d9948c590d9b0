use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::access::DenyReason;
use crate::domain::auth::models::SecurityContext;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

pub async fn current_user(
    State(state): State<AppState>,
    Extension(context): Extension<SecurityContext>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let principal = context
        .principal()
        .ok_or(ApiError::from(DenyReason::Unauthenticated))?;

    state
        .user_service
        .get_user(&principal.id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::domain::access::Decision;
use crate::domain::auth::models::SecurityContext;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves the bearer token (if any) into a [`SecurityContext`] stored in the
/// request extensions.
///
/// Never rejects a request itself: a missing, malformed, forged or expired token,
/// or one whose account is gone or disabled, leaves the request anonymous and the
/// route policy decides what that means.
pub async fn request_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let context = match bearer_token(req.headers()) {
        None => SecurityContext::anonymous(),
        Some(token) => match state.auth_service.resolve_token(&token, Utc::now()).await {
            Ok(principal) => {
                tracing::debug!(
                    username = %principal.username,
                    role = %principal.role,
                    "Request authenticated"
                );
                SecurityContext::authenticated(principal)
            }
            Err(rejection) => {
                tracing::warn!(
                    reason = %rejection,
                    method = %req.method(),
                    path = %req.uri().path(),
                    "Bearer token rejected"
                );
                SecurityContext::anonymous()
            }
        },
    };

    req.extensions_mut().insert(context);

    next.run(req).await
}

/// Applies the route policy to the context bound by [`request_gate`].
pub async fn authorize(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = req
        .extensions()
        .get::<SecurityContext>()
        .cloned()
        .unwrap_or_default();

    match state
        .route_policy
        .evaluate(req.method(), req.uri().path(), &context)
    {
        Decision::Allow => Ok(next.run(req).await),
        Decision::Deny(reason) => {
            tracing::info!(
                method = %req.method(),
                path = %req.uri().path(),
                reason = ?reason,
                "Request denied"
            );
            Err(reason.into())
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();

    (!token.is_empty()).then(|| token.to_string())
}

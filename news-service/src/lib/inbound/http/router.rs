use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::current_user::current_user;
use super::handlers::login::login;
use super::handlers::public_profile::public_profile;
use super::handlers::register::register;
use super::handlers::set_user_active::activate_user;
use super::handlers::set_user_active::deactivate_user;
use super::middleware::authorize;
use super::middleware::request_gate;
use crate::domain::access::RoutePolicy;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub user_service: Arc<dyn UserServicePort>,
    pub route_policy: Arc<RoutePolicy>,
}

/// Build the HTTP application.
///
/// Every request passes the request gate, then the route policy, before reaching a
/// handler.
pub fn create_router(
    auth_service: Arc<dyn AuthServicePort>,
    user_service: Arc<dyn UserServicePort>,
    route_policy: Arc<RoutePolicy>,
) -> Router {
    let state = AppState {
        auth_service,
        user_service,
        route_policy,
    };

    let auth_routes = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register));

    let user_routes = Router::new()
        .route("/api/users/me", get(current_user))
        .route("/api/users/perfil/:username", get(public_profile))
        .route("/api/users/:user_id/activate", put(activate_user))
        .route("/api/users/:user_id/deactivate", put(deactivate_user));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    // Layers run bottom-up: the gate binds the context before authorization reads it.
    Router::new()
        .merge(auth_routes)
        .merge(user_routes)
        .layer(middleware::from_fn_with_state(state.clone(), authorize))
        .layer(middleware::from_fn_with_state(state.clone(), request_gate))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

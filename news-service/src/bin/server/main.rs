use std::sync::Arc;

use auth::Authenticator;
use auth::TokenCodec;
use chrono::Duration;
use news_service::config::Config;
use news_service::domain::access::RoutePolicy;
use news_service::domain::auth::service::AuthService;
use news_service::domain::user::service::UserService;
use news_service::inbound::http::router::create_router;
use news_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "news_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "news-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        token_ttl_seconds = config.jwt.expiration_seconds,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let token_ttl = Duration::try_seconds(config.jwt.expiration_seconds)
        .ok_or_else(|| anyhow::anyhow!("jwt.expiration_seconds is out of range"))?;
    let token_codec = TokenCodec::new(config.jwt.secret.as_bytes(), token_ttl)?;
    let authenticator = Arc::new(Authenticator::new(token_codec));
    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));

    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repository),
        authenticator,
    ));
    let user_service = Arc::new(UserService::new(user_repository));
    let route_policy = Arc::new(RoutePolicy::news_defaults());

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, user_service, route_policy);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");

    Ok(())
}

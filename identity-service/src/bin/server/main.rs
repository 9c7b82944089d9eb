use std::net::SocketAddr;
use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use auth::SigningKey;
use auth::TokenIssuer;
use auth::TokenVerifier;
use identity_service::config::Config;
use identity_service::domain::authentication::service::AuthService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        token_ttl_seconds = config.jwt.ttl_seconds,
        hashing_memory_kib = config.password.memory_kib,
        hashing_iterations = config.password.iterations,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let signing_key = SigningKey::new(config.jwt.secret.as_bytes())?;
    let password_hasher = PasswordHasher::with_cost(config.password.hashing_cost())?;

    let mut token_issuer = TokenIssuer::new(signing_key.clone(), config.jwt.ttl_seconds)?;
    let mut token_verifier = TokenVerifier::new(signing_key);
    if let Some(issuer) = &config.jwt.issuer {
        token_issuer = token_issuer.with_issuer(issuer.clone());
        token_verifier = token_verifier.with_issuer(issuer);
    }

    let authenticator = Arc::new(Authenticator::new(
        password_hasher,
        token_issuer,
        token_verifier,
    )?);
    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));

    let auth_service = Arc::new(AuthService::new(
        user_repository,
        authenticator,
        config.password.min_length,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service);
    axum::serve(
        http_listener,
        http_application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    tracing::info!("Server exited");

    Ok(())
}

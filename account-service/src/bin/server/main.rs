use std::sync::Arc;

use account_service::config::Config;
use account_service::domain::todo::service::TodoService;
use account_service::domain::user::gatekeeper::AdminViolationSanction;
use account_service::domain::user::gatekeeper::Gatekeeper;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::mail::SmtpMailer;
use account_service::outbound::repositories::PostgresTodoRepository;
use account_service::outbound::repositories::PostgresUserRepository;
use anyhow::Context;
use auth::Authenticator;
use auth::CredentialStore;
use auth::TokenService;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        public_url = %config.server.public_url,
        activation = config.activation.enabled,
        smtp_host = %config.smtp.host,
        "Configuration loaded"
    );

    let private_pem = tokio::fs::read(&config.jwt.private_key_file)
        .await
        .with_context(|| format!("reading {}", config.jwt.private_key_file))?;
    let public_pem = tokio::fs::read(&config.jwt.public_key_file)
        .await
        .with_context(|| format!("reading {}", config.jwt.public_key_file))?;
    let tokens = TokenService::from_rsa_pem(
        &private_pem,
        &public_pem,
        chrono::Duration::hours(config.jwt.expiration_hours),
    )?;
    let authenticator = Arc::new(Authenticator::new(CredentialStore::new(), tokens));
    tracing::info!(
        expiration_hours = config.jwt.expiration_hours,
        "Signing keys loaded"
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

    let http_port = config.server.http_port;
    let shared_config = config.into_shared();

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let todo_repository = Arc::new(PostgresTodoRepository::new(pg_pool));
    let mailer = Arc::new(SmtpMailer::new(shared_config.clone()));

    let user_service = Arc::new(UserService::new(
        Arc::clone(&user_repository),
        mailer,
        Arc::clone(&authenticator),
    ));
    let todo_service = Arc::new(TodoService::new(todo_repository));
    let gatekeeper = Arc::new(Gatekeeper::new(
        user_repository,
        authenticator,
        AdminViolationSanction::default(),
    ));

    let http_address = format!("0.0.0.0:{}", http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, todo_service, gatekeeper, shared_config);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");

    Ok(())
}

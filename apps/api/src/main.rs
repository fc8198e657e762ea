//! Lumora API composition root.

#![forbid(unsafe_code)]

mod api_router;
mod auth;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use lumora_application::{
    BookingService, ClaimsSyncService, EmailService, NotificationService,
};
use lumora_core::AppError;
use lumora_infrastructure::{
    AuthProviderConfig, ConsoleEmailService, HttpAuthProviderClient, PostgresBookingRepository,
    PostgresCatalogRepository, PostgresEmailLogRepository, PostgresProfileRepository,
    PostgresSystemLogRepository, SmtpEmailConfig, SmtpEmailService,
};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

    let database_url = required_env("DATABASE_URL")?;
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    Url::parse(frontend_url.as_str())
        .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);

    let auth_provider_url = env::var("AUTH_PROVIDER_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:9099".to_owned())
        .trim_end_matches('/')
        .to_owned();
    Url::parse(auth_provider_url.as_str())
        .map_err(|error| AppError::Validation(format!("invalid AUTH_PROVIDER_URL: {error}")))?;
    let auth_service_token = required_env("AUTH_PROVIDER_SERVICE_TOKEN")?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    if env::var("DEV_SEED").is_ok_and(|value| value.eq_ignore_ascii_case("true")) {
        dev_seed::run(&pool).await?;
    }

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let auth_provider = Arc::new(HttpAuthProviderClient::new(
        http_client,
        AuthProviderConfig {
            base_url: auth_provider_url,
            service_token: auth_service_token,
        },
    ));

    let email_service = build_email_service()?;
    let catalog_repository = Arc::new(PostgresCatalogRepository::new(pool.clone()));
    let booking_repository = Arc::new(PostgresBookingRepository::new(pool.clone()));
    let profile_repository = Arc::new(PostgresProfileRepository::new(pool.clone()));
    let email_log_repository = Arc::new(PostgresEmailLogRepository::new(pool.clone()));
    let system_log_repository = Arc::new(PostgresSystemLogRepository::new(pool));

    let notification_service = NotificationService::new(email_service, email_log_repository);
    let booking_service = BookingService::new(
        catalog_repository.clone(),
        booking_repository,
        profile_repository.clone(),
        notification_service,
    );
    let claims_service = ClaimsSyncService::new(
        profile_repository.clone(),
        auth_provider.clone(),
        system_log_repository,
    );

    let app_state = AppState {
        booking_service,
        claims_service,
        catalog_repository,
        profile_repository,
        token_verifier: auth_provider,
    };

    let app = api_router::build_router(app_state, frontend_url.as_str())?;

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "lumora-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn build_email_service() -> Result<Arc<dyn EmailService>, AppError> {
    let email_provider = env::var("EMAIL_PROVIDER").unwrap_or_else(|_| "console".to_owned());

    match email_provider.as_str() {
        "console" => Ok(Arc::new(ConsoleEmailService::new())),
        "smtp" => {
            let config = SmtpEmailConfig {
                host: required_env("SMTP_HOST")?,
                port: env::var("SMTP_PORT")
                    .ok()
                    .and_then(|value| value.parse::<u16>().ok())
                    .unwrap_or(587),
                username: required_env("SMTP_USERNAME")?,
                password: required_env("SMTP_PASSWORD")?,
                from_address: required_env("SMTP_FROM_ADDRESS")?,
            };
            Ok(Arc::new(SmtpEmailService::new(config)))
        }
        other => Err(AppError::Validation(format!(
            "unknown EMAIL_PROVIDER '{other}', expected 'console' or 'smtp'"
        ))),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

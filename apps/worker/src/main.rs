//! Lumora reminder worker runtime.
//!
//! Runs the day-before reminder job once per day at a configured local
//! time. A failure in the job's query stage is retried within a bounded
//! budget; per-booking delivery failures never fail the run.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Local, NaiveTime, TimeZone};
use lumora_application::{
    EmailService, NotificationService, ReminderRunSummary, ReminderService,
};
use lumora_core::{AppError, AppResult};
use lumora_infrastructure::{
    ConsoleEmailService, PostgresBookingRepository, PostgresEmailLogRepository,
    PostgresProfileRepository, SmtpEmailConfig, SmtpEmailService,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    run_time: NaiveTime,
    max_retries: u32,
    retry_delay_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let run_once = env::args().nth(1).as_deref() == Some("--once");

    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;
    let reminder_service = build_reminder_service(pool)?;

    info!(
        run_time = %config.run_time,
        max_retries = config.max_retries,
        "lumora-worker started"
    );

    if run_once {
        let summary =
            run_with_retries(&reminder_service, config.max_retries, config.retry_delay_secs)
                .await?;
        info!(
            sent = summary.sent,
            skipped = summary.skipped,
            failed = summary.failed,
            "one-shot reminder run complete"
        );
        return Ok(());
    }

    loop {
        let now = Local::now();
        let next = next_fire_time(now, config.run_time);
        let wait = (next - now)
            .to_std()
            .unwrap_or_else(|_| Duration::from_secs(0));

        info!(next_run = %next, "sleeping until next reminder run");
        tokio::time::sleep(wait).await;

        match run_with_retries(&reminder_service, config.max_retries, config.retry_delay_secs)
            .await
        {
            Ok(summary) => {
                info!(
                    sent = summary.sent,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "reminder run complete"
                );
            }
            Err(error) => {
                warn!(error = %error, "reminder run failed, giving up until the next schedule");
            }
        }
    }
}

/// Returns the next local occurrence of `run_time` strictly after `now`.
fn next_fire_time(now: DateTime<Local>, run_time: NaiveTime) -> DateTime<Local> {
    let mut naive = now.date_naive().and_time(run_time);
    if naive <= now.naive_local() {
        naive = (now.date_naive() + Days::new(1)).and_time(run_time);
    }

    // An ambiguous or skipped local time (DST transition) falls back to one
    // hour later.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or(now + chrono::Duration::hours(1))
}

async fn run_with_retries(
    service: &ReminderService,
    max_retries: u32,
    retry_delay_secs: u64,
) -> AppResult<ReminderRunSummary> {
    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        match service.run().await {
            Ok(summary) => return Ok(summary),
            Err(error) if attempt <= max_retries => {
                warn!(error = %error, attempt, "reminder run failed, retrying");
                tokio::time::sleep(Duration::from_secs(retry_delay_secs)).await;
            }
            Err(error) => return Err(error),
        }
    }
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_reminder_service(pool: PgPool) -> AppResult<ReminderService> {
    let booking_repository = Arc::new(PostgresBookingRepository::new(pool.clone()));
    let profile_repository = Arc::new(PostgresProfileRepository::new(pool.clone()));
    let email_log_repository = Arc::new(PostgresEmailLogRepository::new(pool));
    let email_service = build_email_service()?;
    let notification_service = NotificationService::new(email_service, email_log_repository);

    Ok(ReminderService::new(
        booking_repository,
        profile_repository,
        notification_service,
    ))
}

fn build_email_service() -> AppResult<Arc<dyn EmailService>> {
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

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;

        let run_time_raw =
            env::var("REMINDER_RUN_TIME").unwrap_or_else(|_| "09:00".to_owned());
        let run_time = NaiveTime::parse_from_str(run_time_raw.as_str(), "%H:%M").map_err(|_| {
            AppError::Validation(format!(
                "invalid REMINDER_RUN_TIME '{run_time_raw}', expected HH:MM"
            ))
        })?;

        let max_retries = parse_env_u32("REMINDER_MAX_RETRIES", 2)?;
        let retry_delay_secs = parse_env_u64("REMINDER_RETRY_DELAY_SECS", 60)?;

        Ok(Self {
            database_url,
            run_time,
            max_retries,
            retry_delay_secs,
        })
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

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_u32(name: &str, default: u32) -> AppResult<u32> {
    match env::var(name) {
        Ok(value) => value.parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveTime, TimeZone};

    use super::next_fire_time;

    #[test]
    fn fire_time_later_today_is_chosen() {
        let now = Local
            .with_ymd_and_hms(2026, 3, 10, 8, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("fixed timestamp should resolve"));
        let run_time = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default();

        let next = next_fire_time(now, run_time);
        assert_eq!(next.date_naive(), now.date_naive());
        assert_eq!(next.time(), run_time);
    }

    #[test]
    fn fire_time_already_past_rolls_to_tomorrow() {
        let now = Local
            .with_ymd_and_hms(2026, 3, 10, 9, 30, 0)
            .single()
            .unwrap_or_else(|| panic!("fixed timestamp should resolve"));
        let run_time = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default();

        let next = next_fire_time(now, run_time);
        assert_eq!(
            next.date_naive(),
            now.date_naive() + chrono::Days::new(1)
        );
    }
}

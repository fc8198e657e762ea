use async_trait::async_trait;
use sqlx::PgPool;

use lumora_application::{EmailLogEntry, EmailLogRepository};
use lumora_core::{AppError, AppResult};

/// PostgreSQL-backed append-only email delivery audit log.
#[derive(Clone)]
pub struct PostgresEmailLogRepository {
    pool: PgPool,
}

impl PostgresEmailLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailLogRepository for PostgresEmailLogRepository {
    async fn append(&self, entry: EmailLogEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO email_log (kind, recipient, booking_id, succeeded, error)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.kind.as_str())
        .bind(entry.recipient)
        .bind(entry.booking_id.map(|id| id.as_uuid()))
        .bind(entry.succeeded)
        .bind(entry.error)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append email log: {error}")))?;

        Ok(())
    }
}

use async_trait::async_trait;
use sqlx::PgPool;

use lumora_application::{SystemLogEntry, SystemLogRepository};
use lumora_core::{AppError, AppResult};

/// PostgreSQL-backed append-only claims update audit log.
#[derive(Clone)]
pub struct PostgresSystemLogRepository {
    pool: PgPool,
}

impl PostgresSystemLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SystemLogRepository for PostgresSystemLogRepository {
    async fn append(&self, entry: SystemLogEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO system_log (uid, actor, old_role, new_role, succeeded, error)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.uid)
        .bind(entry.actor)
        .bind(entry.old_role.map(|role| role.as_str()))
        .bind(entry.new_role.as_str())
        .bind(entry.succeeded)
        .bind(entry.error)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append system log: {error}")))?;

        Ok(())
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use lumora_application::ProfileRepository;
use lumora_core::{AppError, AppResult};
use lumora_domain::{NotificationPreferences, Permissions, UserProfile, UserRole};

/// PostgreSQL-backed user profile repository.
#[derive(Clone)]
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    uid: String,
    email: String,
    display_name: String,
    role: String,
    permissions: Json<Permissions>,
    active: bool,
    notification_preferences: Json<NotificationPreferences>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = AppError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role: UserRole = row.role.parse().map_err(|_| {
            AppError::Internal(format!(
                "profile '{}' has unknown role '{}'",
                row.uid, row.role
            ))
        })?;

        Ok(UserProfile {
            uid: row.uid,
            email: row.email,
            display_name: row.display_name,
            role,
            permissions: row.permissions.0,
            active: row.active,
            notification_preferences: row.notification_preferences.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const PROFILE_COLUMNS: &str =
    "uid, email, display_name, role, permissions, active, notification_preferences, \
     created_at, updated_at";

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<UserProfile>> {
        let query = format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM user_profiles
            WHERE uid = $1
            LIMIT 1
            "#
        );

        let row = sqlx::query_as::<_, ProfileRow>(query.as_str())
            .bind(uid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to find profile: {error}")))?;

        row.map(UserProfile::try_from).transpose()
    }

    async fn save(&self, profile: UserProfile) -> AppResult<UserProfile> {
        let query = format!(
            r#"
            INSERT INTO user_profiles (
                uid, email, display_name, role, permissions, active,
                notification_preferences
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (uid) DO UPDATE SET
                email = EXCLUDED.email,
                display_name = EXCLUDED.display_name,
                role = EXCLUDED.role,
                permissions = EXCLUDED.permissions,
                active = EXCLUDED.active,
                notification_preferences = EXCLUDED.notification_preferences,
                updated_at = now()
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ProfileRow>(query.as_str())
            .bind(profile.uid)
            .bind(profile.email)
            .bind(profile.display_name)
            .bind(profile.role.as_str())
            .bind(Json(profile.permissions))
            .bind(profile.active)
            .bind(Json(profile.notification_preferences))
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to save profile: {error}")))?;

        UserProfile::try_from(row)
    }
}

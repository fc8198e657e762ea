use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use lumora_application::CatalogRepository;
use lumora_core::{AppError, AppResult};
use lumora_domain::{Price, Service, ServiceId, Subservice, SubserviceId};

/// PostgreSQL-backed read-only catalog repository.
///
/// Price columns keep the platform's raw representation (a bare number or a
/// `$`-prefixed string); parsing happens on read so imported catalog rows
/// survive unchanged.
#[derive(Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ServiceRow {
    id: String,
    name: String,
    price: String,
    duration_minutes: i32,
    active: bool,
    subservices: Json<Vec<SubserviceDocument>>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubserviceDocument {
    id: String,
    name: String,
    #[serde(default)]
    price: Option<serde_json::Value>,
    #[serde(default)]
    duration_minutes: u32,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

impl TryFrom<ServiceRow> for Service {
    type Error = AppError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        let price: Price = row.price.parse().map_err(|error| {
            AppError::Internal(format!("catalog row '{}' has a bad price: {error}", row.id))
        })?;

        let duration_minutes = u32::try_from(row.duration_minutes).map_err(|_| {
            AppError::Internal(format!("catalog row '{}' has a bad duration", row.id))
        })?;

        let subservices = row
            .subservices
            .0
            .into_iter()
            .map(|document| {
                let price = Price::parse(document.price.as_ref()).map_err(|error| {
                    AppError::Internal(format!(
                        "subservice '{}' has a bad price: {error}",
                        document.id
                    ))
                })?;
                Ok(Subservice {
                    id: SubserviceId::new(document.id),
                    name: document.name,
                    price,
                    duration_minutes: document.duration_minutes,
                    active: document.active,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Service {
            id: ServiceId::new(row.id),
            name: row.name,
            price,
            duration_minutes,
            active: row.active,
            subservices,
        })
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn find_service(&self, id: &ServiceId) -> AppResult<Option<Service>> {
        let row = sqlx::query_as::<_, ServiceRow>(
            r#"
            SELECT id, name, price, duration_minutes, active, subservices
            FROM services
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find service: {error}")))?;

        row.map(Service::try_from).transpose()
    }

    async fn list_active_services(&self) -> AppResult<Vec<Service>> {
        let rows = sqlx::query_as::<_, ServiceRow>(
            r#"
            SELECT id, name, price, duration_minutes, active, subservices
            FROM services
            WHERE active = TRUE
            ORDER BY display_order, name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list services: {error}")))?;

        rows.into_iter().map(Service::try_from).collect()
    }
}

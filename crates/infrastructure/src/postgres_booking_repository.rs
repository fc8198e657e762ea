use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use lumora_application::{BookingRepository, NewBooking};
use lumora_core::{AppError, AppResult};
use lumora_domain::{Booking, BookingId, BookingStatus, EmailAddress, Price, PricedLine};

/// PostgreSQL-backed booking repository.
///
/// Timestamps are assigned by the database so every stored record carries
/// server time, not client time.
#[derive(Clone)]
pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct BookingRow {
    id: Uuid,
    customer_name: String,
    customer_email: Option<String>,
    customer_phone: Option<String>,
    booking_date: NaiveDate,
    booking_time: NaiveTime,
    lines: Json<Vec<PricedLine>>,
    total_price_cents: i64,
    total_duration_minutes: i32,
    notes: Option<String>,
    status: String,
    owner_uid: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status: BookingStatus = row.status.parse().map_err(|_| {
            AppError::Internal(format!(
                "booking '{}' has unknown status '{}'",
                row.id, row.status
            ))
        })?;

        let customer_email = row
            .customer_email
            .map(EmailAddress::new)
            .transpose()
            .map_err(|error| {
                AppError::Internal(format!("booking '{}' has a bad email: {error}", row.id))
            })?;

        let total_duration_minutes = u32::try_from(row.total_duration_minutes).map_err(|_| {
            AppError::Internal(format!("booking '{}' has a bad duration", row.id))
        })?;

        Ok(Booking {
            id: BookingId::from_uuid(row.id),
            customer_name: row.customer_name,
            customer_email,
            customer_phone: row.customer_phone,
            date: row.booking_date,
            time: row.booking_time,
            lines: row.lines.0,
            total_price: Price::from_cents(row.total_price_cents),
            total_duration_minutes,
            notes: row.notes,
            status,
            owner_uid: row.owner_uid,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, customer_name, customer_email, customer_phone, booking_date, \
     booking_time, lines, total_price_cents, total_duration_minutes, notes, status, owner_uid, \
     created_at, updated_at";

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn create(&self, booking: NewBooking) -> AppResult<Booking> {
        let id = BookingId::new();
        let query = format!(
            r#"
            INSERT INTO bookings (
                id, customer_name, customer_email, customer_phone, booking_date,
                booking_time, lines, total_price_cents, total_duration_minutes,
                notes, status, owner_uid
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending', $11)
            RETURNING {BOOKING_COLUMNS}
            "#
        );

        let total_duration_minutes =
            i32::try_from(booking.total_duration_minutes).map_err(|_| {
                AppError::Validation("total duration exceeds the storable range".to_owned())
            })?;

        let row = sqlx::query_as::<_, BookingRow>(query.as_str())
            .bind(id.as_uuid())
            .bind(booking.customer_name)
            .bind(String::from(booking.customer_email))
            .bind(booking.customer_phone)
            .bind(booking.date)
            .bind(booking.time)
            .bind(Json(booking.lines))
            .bind(booking.total_price.cents())
            .bind(total_duration_minutes)
            .bind(booking.notes)
            .bind(booking.owner_uid)
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to create booking: {error}")))?;

        Booking::try_from(row)
    }

    async fn find(&self, id: BookingId) -> AppResult<Option<Booking>> {
        let query = format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE id = $1
            LIMIT 1
            "#
        );

        let row = sqlx::query_as::<_, BookingRow>(query.as_str())
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to find booking: {error}")))?;

        row.map(Booking::try_from).transpose()
    }

    async fn update_status(&self, id: BookingId, status: BookingStatus) -> AppResult<Booking> {
        let query = format!(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, BookingRow>(query.as_str())
            .bind(id.as_uuid())
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to update booking status: {error}"))
            })?
            .ok_or_else(|| AppError::NotFound(format!("booking '{id}' does not exist")))?;

        Booking::try_from(row)
    }

    async fn list_by_date_and_status(
        &self,
        date: NaiveDate,
        status: BookingStatus,
    ) -> AppResult<Vec<Booking>> {
        let query = format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE booking_date = $1 AND status = $2
            ORDER BY booking_time
            "#
        );

        let rows = sqlx::query_as::<_, BookingRow>(query.as_str())
            .bind(date)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list bookings: {error}")))?;

        rows.into_iter().map(Booking::try_from).collect()
    }
}

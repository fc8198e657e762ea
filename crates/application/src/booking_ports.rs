use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use lumora_core::AppResult;
use lumora_domain::{Booking, BookingId, BookingStatus, EmailAddress, Price, PricedLine};

/// Input payload for booking creation.
///
/// Identifier and timestamps are server-assigned by the repository; status
/// is always `pending` for a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    /// Customer display name.
    pub customer_name: String,
    /// Validated customer email.
    pub customer_email: EmailAddress,
    /// Optional customer phone number.
    pub customer_phone: Option<String>,
    /// Booked calendar day.
    pub date: NaiveDate,
    /// Booked local wall-clock time.
    pub time: NaiveTime,
    /// Recomputed booking lines.
    pub lines: Vec<PricedLine>,
    /// Sum of recomputed line prices.
    pub total_price: Price,
    /// Sum of recomputed line durations in minutes.
    pub total_duration_minutes: u32,
    /// Optional free-text notes.
    pub notes: Option<String>,
    /// Owning user subject, absent for anonymous bookings.
    pub owner_uid: Option<String>,
}

/// Repository port for booking persistence.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persists a new booking and returns the stored record.
    ///
    /// Every call creates exactly one new record; there is no idempotency
    /// key, so duplicate submissions create duplicate bookings.
    async fn create(&self, booking: NewBooking) -> AppResult<Booking>;

    /// Returns one booking by identifier.
    async fn find(&self, id: BookingId) -> AppResult<Option<Booking>>;

    /// Writes a new status and update timestamp, returning the updated
    /// record. Errors with `NotFound` when no such booking exists.
    async fn update_status(&self, id: BookingId, status: BookingStatus) -> AppResult<Booking>;

    /// Lists bookings for one calendar day with the given status.
    async fn list_by_date_and_status(
        &self,
        date: NaiveDate,
        status: BookingStatus,
    ) -> AppResult<Vec<Booking>>;
}

//! Booking requests, validation rules, and persisted booking records.
//!
//! Validation is pure: no catalog reads happen here. A request that fails
//! any shape or range rule is rejected with the full list of field
//! violations so the booking form can highlight every offending input.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};
use lumora_core::{AppError, AppResult, FieldErrors};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Price, ServiceId, SubserviceId};

/// Minimum customer name length in characters.
pub const CUSTOMER_NAME_MIN: usize = 2;

/// Maximum customer name length in characters.
pub const CUSTOMER_NAME_MAX: usize = 100;

/// Maximum number of service selections in one booking.
pub const MAX_SERVICE_SELECTIONS: usize = 10;

/// Maximum free-text notes length in characters.
pub const NOTES_MAX_CHARS: usize = 500;

/// How far ahead a booking may be placed, in calendar months. The boundary
/// date itself is accepted.
pub const MAX_ADVANCE_MONTHS: u32 = 6;

/// Unique identifier for a booking record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random booking identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a booking identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for BookingId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one
    /// `@`, local part and domain are non-empty, domain contains at least
    /// one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let parts: Vec<&str> = trimmed.splitn(2, '@').collect();
        if parts.len() != 2 {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        let local = parts[0];
        let domain = parts[1];

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl Display for EmailAddress {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Lifecycle status of a booking.
///
/// Transitions are unconstrained: any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Awaiting staff confirmation. Every new booking starts here.
    Pending,
    /// Confirmed by staff; eligible for reminder delivery.
    Confirmed,
    /// Cancelled by either side.
    Cancelled,
    /// Appointment took place.
    Completed,
}

impl BookingStatus {
    /// Returns the stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(AppError::Validation(format!(
                "unknown booking status '{value}'"
            ))),
        }
    }
}

impl Display for BookingStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}

/// One requested (service, optional subservice) pair.
///
/// Any price or duration the client attaches to a selection is discarded;
/// authoritative values are recomputed from the catalog at booking time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSelection {
    /// Requested service.
    pub service_id: ServiceId,
    /// Optional add-on within the service.
    #[serde(default)]
    pub subservice_id: Option<SubserviceId>,
}

/// Raw booking request as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// Customer display name.
    pub customer_name: String,
    /// Customer contact email.
    pub customer_email: String,
    /// Optional customer phone number.
    #[serde(default)]
    pub customer_phone: Option<String>,
    /// Requested calendar day as a `YYYY-MM-DD` string.
    pub date: String,
    /// Requested local wall-clock time as an `HH:MM` string.
    pub time: String,
    /// Selected services, at least one and at most ten.
    pub services: Vec<ServiceSelection>,
    /// Optional free-text notes, bounded length.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A booking request that passed all shape and range rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBookingRequest {
    /// Customer display name, trimmed.
    pub customer_name: String,
    /// Validated customer email.
    pub customer_email: EmailAddress,
    /// Optional phone number, E.164-like.
    pub customer_phone: Option<String>,
    /// Requested calendar day.
    pub date: NaiveDate,
    /// Requested local wall-clock time.
    pub time: NaiveTime,
    /// Selected services.
    pub services: Vec<ServiceSelection>,
    /// Optional free-text notes.
    pub notes: Option<String>,
}

/// One recomputed line of a persisted booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    /// Booked service.
    pub service_id: ServiceId,
    /// Service display name at booking time.
    pub service_name: String,
    /// Booked add-on, if any.
    #[serde(default)]
    pub subservice_id: Option<SubserviceId>,
    /// Add-on display name at booking time.
    #[serde(default)]
    pub subservice_name: Option<String>,
    /// Recomputed line price (service + add-on).
    pub price: Price,
    /// Recomputed line duration in minutes.
    pub duration_minutes: u32,
}

/// A persisted booking record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// Record identifier.
    pub id: BookingId,
    /// Customer display name.
    pub customer_name: String,
    /// Customer contact email. Absent on some imported legacy records.
    pub customer_email: Option<EmailAddress>,
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
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Owning user subject, absent for anonymous bookings.
    pub owner_uid: Option<String>,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Server-assigned last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Validates a raw booking request against all shape and range rules.
///
/// Date comparisons happen at day granularity against `today`, the current
/// calendar day in the deployment's local time zone. Errors accumulate so a
/// single pass reports every offending field.
pub fn validate_booking_request(
    request: &BookingRequest,
    today: NaiveDate,
) -> Result<ValidBookingRequest, FieldErrors> {
    let mut errors = FieldErrors::new();

    let customer_name = request.customer_name.trim().to_owned();
    let name_chars = customer_name.chars().count();
    if !(CUSTOMER_NAME_MIN..=CUSTOMER_NAME_MAX).contains(&name_chars) {
        errors.push(
            "customerName",
            format!("must be between {CUSTOMER_NAME_MIN} and {CUSTOMER_NAME_MAX} characters"),
        );
    }

    let customer_email = match EmailAddress::new(request.customer_email.as_str()) {
        Ok(email) => Some(email),
        Err(error) => {
            errors.push("customerEmail", error.to_string());
            None
        }
    };

    let customer_phone = match request.customer_phone.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(phone) if is_e164_like(phone) => Some(phone.to_owned()),
        Some(_) => {
            errors.push(
                "customerPhone",
                "must be an international phone number, e.g. +15551234567",
            );
            None
        }
    };

    let date = match parse_strict_date(request.date.as_str()) {
        Some(date) => Some(date),
        None => {
            errors.push("date", "must be a calendar day in YYYY-MM-DD format");
            None
        }
    };

    let time = match parse_strict_time(request.time.as_str()) {
        Some(time) => Some(time),
        None => {
            errors.push("time", "must be a 24-hour time in HH:MM format");
            None
        }
    };

    if let Some(date) = date {
        if date < today {
            errors.push("date", "cannot be in the past");
        } else if let Some(latest) = today.checked_add_months(Months::new(MAX_ADVANCE_MONTHS))
            && date > latest
        {
            errors.push(
                "date",
                format!("cannot be more than {MAX_ADVANCE_MONTHS} months ahead"),
            );
        }
    }

    if request.services.is_empty() {
        errors.push("services", "at least one service must be selected");
    } else if request.services.len() > MAX_SERVICE_SELECTIONS {
        errors.push(
            "services",
            format!("at most {MAX_SERVICE_SELECTIONS} services may be selected"),
        );
    }

    for (index, selection) in request.services.iter().enumerate() {
        if selection.service_id.as_str().trim().is_empty() {
            errors.push(
                format!("services[{index}].serviceId"),
                "service id must not be empty",
            );
        }
    }

    let notes = match request.notes.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(notes) if notes.chars().count() <= NOTES_MAX_CHARS => Some(notes.to_owned()),
        Some(_) => {
            errors.push(
                "notes",
                format!("must not exceed {NOTES_MAX_CHARS} characters"),
            );
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    match (customer_email, date, time) {
        (Some(customer_email), Some(date), Some(time)) => Ok(ValidBookingRequest {
            customer_name,
            customer_email,
            customer_phone,
            date,
            time,
            services: request.services.clone(),
            notes,
        }),
        // Unreachable: a missing part always records a violation above.
        _ => Err(errors),
    }
}

/// Accepts `+15551234567`-style values: optional leading `+`, 7 to 15 digits.
fn is_e164_like(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    (7..=15).contains(&digits.len()) && digits.bytes().all(|byte| byte.is_ascii_digit())
}

/// Parses a strictly `YYYY-MM-DD` formatted calendar day.
fn parse_strict_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != 4 && *index != 7)
        .all(|(_, byte)| byte.is_ascii_digit());
    if !digits_ok {
        return None;
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parses a strictly `HH:MM` formatted 24-hour wall-clock time.
fn parse_strict_time(value: &str) -> Option<NaiveTime> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != 2)
        .all(|(_, byte)| byte.is_ascii_digit());
    if !digits_ok {
        return None;
    }

    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

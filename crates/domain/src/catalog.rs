//! Catalog types: bookable services, nested subservices, and prices.
//!
//! The catalog is read-only from the booking domain's perspective. Price
//! fields in stored catalog documents may be bare numbers or `$`-prefixed
//! decimal strings; both forms parse into [`Price`].

use std::fmt::{Display, Formatter};
use std::ops::Add;
use std::str::FromStr;

use lumora_core::{AppError, AppResult};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable logical identifier of a bookable service, e.g. `manicure-basic`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    /// Creates a service identifier from its logical name.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the underlying logical name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ServiceId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Stable logical identifier of a subservice nested under a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubserviceId(String);

impl SubserviceId {
    /// Creates a subservice identifier from its logical name.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the underlying logical name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for SubserviceId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A non-negative monetary amount held in minor units (cents).
///
/// Sums stay exact in integer cents; the stored and rendered representation
/// is the platform's fixed two-decimal `$X.YY` string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
    /// The zero amount, also the default for catalog entries missing a price.
    pub const ZERO: Self = Self(0);

    /// Creates a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents.
    #[must_use]
    pub fn cents(self) -> i64 {
        self.0
    }

    /// Parses a price from a raw catalog value.
    ///
    /// Accepts a bare JSON number (currency units), a decimal string with an
    /// optional leading `$`, or nothing at all, which defaults to zero.
    pub fn parse(value: Option<&serde_json::Value>) -> AppResult<Self> {
        match value {
            None | Some(serde_json::Value::Null) => Ok(Self::ZERO),
            Some(serde_json::Value::Number(number)) => {
                let units = number.as_f64().ok_or_else(|| {
                    AppError::Validation(format!("price value '{number}' is out of range"))
                })?;
                units_to_cents(units)
            }
            Some(serde_json::Value::String(text)) => text.parse(),
            Some(other) => Err(AppError::Validation(format!(
                "price must be a number or string, got {other}"
            ))),
        }
    }
}

impl FromStr for Price {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let without_symbol = trimmed.strip_prefix('$').unwrap_or(trimmed);
        if without_symbol.is_empty() {
            return Ok(Self::ZERO);
        }

        let units = without_symbol.parse::<f64>().map_err(|_| {
            AppError::Validation(format!("price '{value}' is not a valid decimal amount"))
        })?;

        units_to_cents(units)
    }
}

fn units_to_cents(units: f64) -> AppResult<Price> {
    if !units.is_finite() {
        return Err(AppError::Validation(
            "price must be a finite amount".to_owned(),
        ));
    }

    if units < 0.0 {
        return Err(AppError::Validation(
            "price must not be negative".to_owned(),
        ));
    }

    #[allow(clippy::cast_possible_truncation)]
    let cents = (units * 100.0).round() as i64;
    Ok(Price(cents))
}

impl Display for Price {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::parse(Some(&value)).map_err(D::Error::custom)
    }
}

/// A bookable add-on nested under a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subservice {
    /// Stable logical identifier.
    pub id: SubserviceId,
    /// Display name.
    pub name: String,
    /// Price of the add-on, zero when the catalog omits it.
    #[serde(default)]
    pub price: Price,
    /// Duration contribution in minutes.
    #[serde(default)]
    pub duration_minutes: u32,
    /// Whether the add-on may be booked.
    #[serde(default = "default_active")]
    pub active: bool,
}

/// A bookable service with its ordered subservices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Stable logical identifier.
    pub id: ServiceId,
    /// Display name.
    pub name: String,
    /// Base price, zero when the catalog omits it.
    #[serde(default)]
    pub price: Price,
    /// Base duration in minutes.
    #[serde(default)]
    pub duration_minutes: u32,
    /// Whether the service may be booked. Inactive services reject bookings.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Ordered add-ons nested under this service.
    #[serde(default)]
    pub subservices: Vec<Subservice>,
}

impl Service {
    /// Finds a subservice by identifier within this service.
    #[must_use]
    pub fn find_subservice(&self, id: &SubserviceId) -> Option<&Subservice> {
        self.subservices.iter().find(|entry| &entry.id == id)
    }
}

fn default_active() -> bool {
    true
}

//! Domain types and validation rules for the Lumora salon platform.

#![forbid(unsafe_code)]

/// Booking requests, validation rules, and persisted booking records.
pub mod booking;
/// Bookable services, subservices, and price representation.
pub mod catalog;
/// User profiles, roles, capability flags, and derived auth claims.
pub mod profile;

pub use booking::{
    Booking, BookingId, BookingRequest, BookingStatus, EmailAddress, PricedLine, ServiceSelection,
    ValidBookingRequest, validate_booking_request,
};
pub use catalog::{Price, Service, ServiceId, Subservice, SubserviceId};
pub use profile::{AuthClaims, NotificationPreferences, Permissions, UserProfile, UserRole};

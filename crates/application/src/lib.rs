//! Application services and ports for the Lumora booking domain.
//!
//! Services own the business rules; ports are the async traits the
//! infrastructure crate implements against Postgres, SMTP, and the auth
//! provider.

#![forbid(unsafe_code)]

/// Auth-provider ports: claims writes, token verification, claim audit log.
pub mod auth_ports;
/// Booking persistence port and input payloads.
pub mod booking_ports;
/// Booking use-cases: create, read, status updates, manual resend.
pub mod booking_service;
/// Catalog read port.
pub mod catalog_ports;
/// Claims synchronization and manual refresh.
pub mod claims_service;
/// Notification ports: email transport and delivery audit log.
pub mod notification_ports;
/// Email rendering and fire-and-log dispatch.
pub mod notification_service;
/// Server-side price and duration recomputation.
pub mod pricing;
/// Profile persistence port.
pub mod profile_ports;
/// Day-before reminder job.
pub mod reminder_service;

pub use auth_ports::{AuthenticatedUser, ClaimsWriter, SystemLogEntry, SystemLogRepository, TokenVerifier};
pub use booking_ports::{BookingRepository, NewBooking};
pub use booking_service::BookingService;
pub use catalog_ports::CatalogRepository;
pub use claims_service::{ClaimsSyncService, ProfileChangeEvent, SyncOutcome};
pub use notification_ports::{
    DispatchOutcome, EmailLogEntry, EmailLogRepository, EmailMessage, EmailService, MessageKind,
};
pub use notification_service::NotificationService;
pub use pricing::{Quote, price_selections};
pub use profile_ports::ProfileRepository;
pub use reminder_service::{ReminderRunSummary, ReminderService};

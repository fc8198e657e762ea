//! Infrastructure implementations of the Lumora application ports:
//! Postgres repositories, email transports, and the auth-provider client.

#![forbid(unsafe_code)]

/// Development email transport that logs instead of sending.
pub mod console_email_service;
/// Auth-provider HTTP client: token verification and claims writes.
pub mod http_auth_provider;
/// In-memory port implementations for tests and local development.
pub mod in_memory;
/// Postgres-backed booking repository.
pub mod postgres_booking_repository;
/// Postgres-backed read-only catalog repository.
pub mod postgres_catalog_repository;
/// Postgres-backed append-only email delivery audit log.
pub mod postgres_email_log_repository;
/// Postgres-backed user profile repository.
pub mod postgres_profile_repository;
/// Postgres-backed append-only claims update audit log.
pub mod postgres_system_log_repository;
/// SMTP email transport using `lettre`.
pub mod smtp_email_service;

pub use console_email_service::ConsoleEmailService;
pub use http_auth_provider::{AuthProviderConfig, HttpAuthProviderClient};
pub use in_memory::{
    InMemoryBookingRepository, InMemoryCatalogRepository, InMemoryEmailLogRepository,
    InMemoryProfileRepository, InMemorySystemLogRepository,
};
pub use postgres_booking_repository::PostgresBookingRepository;
pub use postgres_catalog_repository::PostgresCatalogRepository;
pub use postgres_email_log_repository::PostgresEmailLogRepository;
pub use postgres_profile_repository::PostgresProfileRepository;
pub use postgres_system_log_repository::PostgresSystemLogRepository;
pub use smtp_email_service::{SmtpEmailConfig, SmtpEmailService};

/// Booking creation, retrieval, status updates, and manual resend.
pub mod bookings;
/// Catalog listing for the booking form.
pub mod catalog;
/// Manual claims refresh.
pub mod claims;
/// Liveness probe.
pub mod health;
/// Profile reads and updates, wired to the claims synchronizer.
pub mod profiles;

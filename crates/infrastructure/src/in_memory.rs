//! In-memory port implementations for tests and local development.
//!
//! Each store mirrors the semantics of its Postgres counterpart:
//! server-assigned identifiers and timestamps, `NotFound` on missing
//! update targets, append-only logs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;

use lumora_application::{
    BookingRepository, CatalogRepository, EmailLogEntry, EmailLogRepository, NewBooking,
    ProfileRepository, SystemLogEntry, SystemLogRepository,
};
use lumora_core::{AppError, AppResult};
use lumora_domain::{Booking, BookingId, BookingStatus, Service, ServiceId, UserProfile};

/// In-memory catalog store.
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    services: Mutex<HashMap<ServiceId, Service>>,
}

impl InMemoryCatalogRepository {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a service.
    pub async fn upsert_service(&self, service: Service) {
        self.services
            .lock()
            .await
            .insert(service.id.clone(), service);
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn find_service(&self, id: &ServiceId) -> AppResult<Option<Service>> {
        Ok(self.services.lock().await.get(id).cloned())
    }

    async fn list_active_services(&self) -> AppResult<Vec<Service>> {
        let mut services: Vec<Service> = self
            .services
            .lock()
            .await
            .values()
            .filter(|service| service.active)
            .cloned()
            .collect();
        services.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(services)
    }
}

/// In-memory booking store.
#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: Mutex<Vec<Booking>>,
}

impl InMemoryBookingRepository {
    /// Creates an empty booking store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn create(&self, booking: NewBooking) -> AppResult<Booking> {
        let now = Utc::now();
        let stored = Booking {
            id: BookingId::new(),
            customer_name: booking.customer_name,
            customer_email: Some(booking.customer_email),
            customer_phone: booking.customer_phone,
            date: booking.date,
            time: booking.time,
            lines: booking.lines,
            total_price: booking.total_price,
            total_duration_minutes: booking.total_duration_minutes,
            notes: booking.notes,
            status: BookingStatus::Pending,
            owner_uid: booking.owner_uid,
            created_at: now,
            updated_at: now,
        };
        self.bookings.lock().await.push(stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: BookingId) -> AppResult<Option<Booking>> {
        Ok(self
            .bookings
            .lock()
            .await
            .iter()
            .find(|booking| booking.id == id)
            .cloned())
    }

    async fn update_status(&self, id: BookingId, status: BookingStatus) -> AppResult<Booking> {
        let mut bookings = self.bookings.lock().await;
        let booking = bookings
            .iter_mut()
            .find(|booking| booking.id == id)
            .ok_or_else(|| AppError::NotFound(format!("booking '{id}' does not exist")))?;
        booking.status = status;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    async fn list_by_date_and_status(
        &self,
        date: NaiveDate,
        status: BookingStatus,
    ) -> AppResult<Vec<Booking>> {
        Ok(self
            .bookings
            .lock()
            .await
            .iter()
            .filter(|booking| booking.date == date && booking.status == status)
            .cloned()
            .collect())
    }
}

/// In-memory profile store.
#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: Mutex<HashMap<String, UserProfile>>,
}

impl InMemoryProfileRepository {
    /// Creates an empty profile store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<UserProfile>> {
        Ok(self.profiles.lock().await.get(uid).cloned())
    }

    async fn save(&self, mut profile: UserProfile) -> AppResult<UserProfile> {
        profile.updated_at = Utc::now();
        self.profiles
            .lock()
            .await
            .insert(profile.uid.clone(), profile.clone());
        Ok(profile)
    }
}

/// In-memory email delivery audit log.
#[derive(Default)]
pub struct InMemoryEmailLogRepository {
    entries: Mutex<Vec<EmailLogEntry>>,
}

impl InMemoryEmailLogRepository {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the appended entries.
    pub async fn entries(&self) -> Vec<EmailLogEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl EmailLogRepository for InMemoryEmailLogRepository {
    async fn append(&self, entry: EmailLogEntry) -> AppResult<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }
}

/// In-memory claims update audit log.
#[derive(Default)]
pub struct InMemorySystemLogRepository {
    entries: Mutex<Vec<SystemLogEntry>>,
}

impl InMemorySystemLogRepository {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the appended entries.
    pub async fn entries(&self) -> Vec<SystemLogEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl SystemLogRepository for InMemorySystemLogRepository {
    async fn append(&self, entry: SystemLogEntry) -> AppResult<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lumora_application::{
        BookingService, ClaimsSyncService, NotificationService, ProfileChangeEvent,
        ReminderService, SyncOutcome,
    };
    use lumora_core::AppResult;
    use lumora_domain::{
        BookingRequest, BookingStatus, NotificationPreferences, Permissions, Price, Service,
        ServiceId, ServiceSelection, UserProfile, UserRole,
    };

    use super::*;
    use crate::console_email_service::ConsoleEmailService;

    struct RecordingClaimsWriter {
        writes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl lumora_application::ClaimsWriter for RecordingClaimsWriter {
        async fn set_claims(
            &self,
            uid: &str,
            _claims: &lumora_domain::AuthClaims,
        ) -> AppResult<()> {
            self.writes.lock().await.push(uid.to_owned());
            Ok(())
        }
    }

    fn manicure() -> Service {
        Service {
            id: ServiceId::new("manicure-basic"),
            name: "Basic Manicure".to_owned(),
            price: Price::from_cents(2000),
            duration_minutes: 30,
            active: true,
            subservices: Vec::new(),
        }
    }

    fn profile(uid: &str, role: UserRole) -> UserProfile {
        UserProfile {
            uid: uid.to_owned(),
            email: format!("{uid}@example.com"),
            display_name: "Test User".to_owned(),
            role,
            permissions: Permissions::for_role(role),
            active: true,
            notification_preferences: NotificationPreferences::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    // Full wiring test: the application services running over the in-memory
    // stores exactly as the API composes them over Postgres.
    #[tokio::test]
    async fn booking_flow_works_end_to_end_over_in_memory_stores() {
        let catalog = Arc::new(InMemoryCatalogRepository::new());
        catalog.upsert_service(manicure()).await;
        let bookings = Arc::new(InMemoryBookingRepository::new());
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let email_log = Arc::new(InMemoryEmailLogRepository::new());
        let notifications =
            NotificationService::new(Arc::new(ConsoleEmailService::new()), email_log.clone());

        let booking_service = BookingService::new(
            catalog.clone(),
            bookings.clone(),
            profiles.clone(),
            notifications.clone(),
        );
        let reminder_service =
            ReminderService::new(bookings.clone(), profiles.clone(), notifications);

        // The booking service and the reminder job both work in local time.
        let tomorrow = chrono::Local::now().date_naive() + chrono::Days::new(1);
        let created = booking_service
            .create_booking(
                None,
                BookingRequest {
                    customer_name: "Ana Gomez".to_owned(),
                    customer_email: "ana@example.com".to_owned(),
                    customer_phone: None,
                    date: tomorrow.format("%Y-%m-%d").to_string(),
                    time: "10:00".to_owned(),
                    services: vec![ServiceSelection {
                        service_id: ServiceId::new("manicure-basic"),
                        subservice_id: None,
                    }],
                    notes: None,
                },
            )
            .await
            .unwrap_or_else(|error| panic!("booking should be created: {error}"));

        assert_eq!(created.total_price.to_string(), "$20.00");
        assert_eq!(created.status, BookingStatus::Pending);

        let confirmed = bookings
            .update_status(created.id, BookingStatus::Confirmed)
            .await
            .unwrap_or_else(|error| panic!("status update should succeed: {error}"));
        assert_eq!(confirmed.status, BookingStatus::Confirmed);

        let summary = reminder_service
            .run()
            .await
            .unwrap_or_else(|error| panic!("reminder run should succeed: {error}"));
        assert_eq!(summary.sent, 1);

        // Confirmation plus reminder, both audit-logged.
        assert_eq!(email_log.entries().await.len(), 2);
    }

    #[tokio::test]
    async fn claims_sync_works_over_in_memory_stores() {
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let system_log = Arc::new(InMemorySystemLogRepository::new());
        let writer = Arc::new(RecordingClaimsWriter {
            writes: Mutex::new(Vec::new()),
        });
        let sync = ClaimsSyncService::new(profiles.clone(), writer.clone(), system_log.clone());

        let before = profiles
            .save(profile("ana-1", UserRole::Customer))
            .await
            .unwrap_or_else(|error| panic!("save should succeed: {error}"));
        let after = profiles
            .save(profile("ana-1", UserRole::Admin))
            .await
            .unwrap_or_else(|error| panic!("save should succeed: {error}"));

        let outcome = sync
            .profile_written(ProfileChangeEvent {
                actor: "admin-0".to_owned(),
                before: Some(before),
                after,
            })
            .await;

        assert_eq!(outcome, SyncOutcome::Updated);
        assert_eq!(writer.writes.lock().await.len(), 1);
        assert_eq!(system_log.entries().await.len(), 1);
    }
}

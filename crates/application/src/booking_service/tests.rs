use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use lumora_core::{AppError, AppResult, UserIdentity};
use lumora_domain::{
    AuthClaims, Booking, BookingId, BookingRequest, BookingStatus, NotificationPreferences,
    Permissions, Price, Service, ServiceId, ServiceSelection, Subservice, SubserviceId,
    UserProfile, UserRole,
};
use tokio::sync::Mutex;

use super::BookingService;
use crate::auth_ports::AuthenticatedUser;
use crate::booking_ports::{BookingRepository, NewBooking};
use crate::catalog_ports::CatalogRepository;
use crate::notification_ports::{
    EmailLogEntry, EmailLogRepository, EmailService, MessageKind,
};
use crate::notification_service::NotificationService;
use crate::profile_ports::ProfileRepository;

struct FakeCatalog {
    services: HashMap<ServiceId, Service>,
    reads: AtomicUsize,
}

impl FakeCatalog {
    fn with_manicure(active: bool) -> Self {
        let manicure = Service {
            id: ServiceId::new("manicure-basic"),
            name: "Basic Manicure".to_owned(),
            price: Price::from_cents(2000),
            duration_minutes: 30,
            active,
            subservices: vec![Subservice {
                id: SubserviceId::new("gel-finish"),
                name: "Gel Finish".to_owned(),
                price: Price::from_cents(1500),
                duration_minutes: 15,
                active: true,
            }],
        };
        Self {
            services: HashMap::from([(manicure.id.clone(), manicure)]),
            reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CatalogRepository for FakeCatalog {
    async fn find_service(&self, id: &ServiceId) -> AppResult<Option<Service>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.services.get(id).cloned())
    }

    async fn list_active_services(&self) -> AppResult<Vec<Service>> {
        Ok(self
            .services
            .values()
            .filter(|service| service.active)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct FakeBookingRepository {
    bookings: Mutex<Vec<Booking>>,
}

#[async_trait]
impl BookingRepository for FakeBookingRepository {
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

#[derive(Default)]
struct FakeProfileRepository {
    profiles: Mutex<HashMap<String, UserProfile>>,
}

#[async_trait]
impl ProfileRepository for FakeProfileRepository {
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<UserProfile>> {
        Ok(self.profiles.lock().await.get(uid).cloned())
    }

    async fn save(&self, profile: UserProfile) -> AppResult<UserProfile> {
        self.profiles
            .lock()
            .await
            .insert(profile.uid.clone(), profile.clone());
        Ok(profile)
    }
}

#[derive(Default)]
struct FakeEmailService {
    fail: bool,
    sent: Mutex<Vec<(String, MessageKind)>>,
}

#[async_trait]
impl EmailService for FakeEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        _text_body: &str,
        _html_body: Option<&str>,
    ) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Internal("smtp connection refused".to_owned()));
        }
        let kind = if subject.starts_with("We received") {
            MessageKind::Confirmation
        } else if subject.starts_with("Reminder") {
            MessageKind::Reminder
        } else {
            MessageKind::StatusChange
        };
        self.sent.lock().await.push((to.to_owned(), kind));
        Ok(())
    }
}

#[derive(Default)]
struct FakeEmailLog {
    entries: Mutex<Vec<EmailLogEntry>>,
}

#[async_trait]
impl EmailLogRepository for FakeEmailLog {
    async fn append(&self, entry: EmailLogEntry) -> AppResult<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }
}

struct Harness {
    service: BookingService,
    bookings: Arc<FakeBookingRepository>,
    profiles: Arc<FakeProfileRepository>,
    transport: Arc<FakeEmailService>,
    email_log: Arc<FakeEmailLog>,
    catalog: Arc<FakeCatalog>,
}

fn harness(catalog: FakeCatalog, failing_email: bool) -> Harness {
    let catalog = Arc::new(catalog);
    let bookings = Arc::new(FakeBookingRepository::default());
    let profiles = Arc::new(FakeProfileRepository::default());
    let transport = Arc::new(FakeEmailService {
        fail: failing_email,
        ..FakeEmailService::default()
    });
    let email_log = Arc::new(FakeEmailLog::default());
    let notifications = NotificationService::new(transport.clone(), email_log.clone());
    let service = BookingService::new(
        catalog.clone(),
        bookings.clone(),
        profiles.clone(),
        notifications,
    );

    Harness {
        service,
        bookings,
        profiles,
        transport,
        email_log,
        catalog,
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap_or_default()
}

fn request() -> BookingRequest {
    BookingRequest {
        customer_name: "Ana Gomez".to_owned(),
        customer_email: "ana@example.com".to_owned(),
        customer_phone: None,
        date: "2026-03-10".to_owned(),
        time: "10:00".to_owned(),
        services: vec![ServiceSelection {
            service_id: ServiceId::new("manicure-basic"),
            subservice_id: None,
        }],
        notes: None,
    }
}

fn staff_user() -> AuthenticatedUser {
    AuthenticatedUser {
        identity: UserIdentity::new("staff-1", "Sam Staff", Some("sam@lumora.salon".to_owned())),
        claims: AuthClaims {
            role: UserRole::Staff,
            permissions: Permissions::for_role(UserRole::Staff),
            last_updated_ms: 0,
        },
    }
}

fn customer_user(uid: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        identity: UserIdentity::new(uid, "Ana Gomez", Some("ana@example.com".to_owned())),
        claims: AuthClaims {
            role: UserRole::Customer,
            permissions: Permissions::default(),
            last_updated_ms: 0,
        },
    }
}

fn profile(uid: &str, confirmations: bool) -> UserProfile {
    UserProfile {
        uid: uid.to_owned(),
        email: "ana@example.com".to_owned(),
        display_name: "Ana Gomez".to_owned(),
        role: UserRole::Customer,
        permissions: Permissions::default(),
        active: true,
        notification_preferences: NotificationPreferences {
            email_confirmations: confirmations,
            email_reminders: true,
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn booking_is_persisted_with_recomputed_totals_and_pending_status() {
    let harness = harness(FakeCatalog::with_manicure(true), false);

    let booking = harness
        .service
        .create_booking_as_of(None, request(), today())
        .await
        .unwrap_or_else(|error| panic!("booking should be created: {error}"));

    assert_eq!(booking.total_price.to_string(), "$20.00");
    assert_eq!(booking.total_duration_minutes, 30);
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.owner_uid, None);
    assert_eq!(harness.bookings.bookings.lock().await.len(), 1);
}

#[tokio::test]
async fn subservice_selection_adds_to_totals() {
    let harness = harness(FakeCatalog::with_manicure(true), false);
    let mut with_subservice = request();
    with_subservice.services = vec![ServiceSelection {
        service_id: ServiceId::new("manicure-basic"),
        subservice_id: Some(SubserviceId::new("gel-finish")),
    }];

    let booking = harness
        .service
        .create_booking_as_of(None, with_subservice, today())
        .await
        .unwrap_or_else(|error| panic!("booking should be created: {error}"));

    assert_eq!(booking.total_price.to_string(), "$35.00");
    assert_eq!(booking.total_duration_minutes, 45);
}

#[tokio::test]
async fn inactive_service_rejects_without_persisting() {
    let harness = harness(FakeCatalog::with_manicure(false), false);

    let result = harness
        .service
        .create_booking_as_of(None, request(), today())
        .await;

    assert!(matches!(result, Err(AppError::FailedPrecondition(_))));
    assert!(harness.bookings.bookings.lock().await.is_empty());
}

#[tokio::test]
async fn past_date_rejects_before_any_catalog_read() {
    let harness = harness(FakeCatalog::with_manicure(true), false);
    let mut stale = request();
    stale.date = "2026-03-09".to_owned();

    let result = harness
        .service
        .create_booking_as_of(None, stale, today())
        .await;

    assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    assert_eq!(harness.catalog.reads.load(Ordering::SeqCst), 0);
    assert!(harness.bookings.bookings.lock().await.is_empty());
}

#[tokio::test]
async fn email_failure_never_loses_the_booking() {
    let harness = harness(FakeCatalog::with_manicure(true), true);

    let booking = harness
        .service
        .create_booking_as_of(None, request(), today())
        .await
        .unwrap_or_else(|error| panic!("booking should be created: {error}"));

    let stored = harness
        .bookings
        .find(booking.id)
        .await
        .unwrap_or_else(|error| panic!("lookup should succeed: {error}"));
    assert!(stored.is_some());

    let entries = harness.email_log.entries.lock().await;
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].succeeded);
}

#[tokio::test]
async fn authenticated_caller_owns_the_booking() {
    let harness = harness(FakeCatalog::with_manicure(true), false);
    let actor = customer_user("ana-1");

    let booking = harness
        .service
        .create_booking_as_of(Some(&actor.identity), request(), today())
        .await
        .unwrap_or_else(|error| panic!("booking should be created: {error}"));

    assert_eq!(booking.owner_uid.as_deref(), Some("ana-1"));
}

#[tokio::test]
async fn owner_preference_suppresses_confirmation_email() {
    let harness = harness(FakeCatalog::with_manicure(true), false);
    let actor = customer_user("ana-1");
    let _ = harness.profiles.save(profile("ana-1", false)).await;

    let _ = harness
        .service
        .create_booking_as_of(Some(&actor.identity), request(), today())
        .await;

    assert!(harness.transport.sent.lock().await.is_empty());
    assert!(harness.email_log.entries.lock().await.is_empty());
}

#[tokio::test]
async fn status_update_writes_then_notifies() {
    let harness = harness(FakeCatalog::with_manicure(true), false);
    let booking = harness
        .service
        .create_booking_as_of(None, request(), today())
        .await
        .unwrap_or_else(|error| panic!("booking should be created: {error}"));

    let updated = harness
        .service
        .update_status(&staff_user(), booking.id, BookingStatus::Confirmed)
        .await
        .unwrap_or_else(|error| panic!("status update should succeed: {error}"));

    assert_eq!(updated.status, BookingStatus::Confirmed);
    let sent = harness.transport.sent.lock().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].1, MessageKind::StatusChange);
}

#[tokio::test]
async fn status_update_requires_booking_management() {
    let harness = harness(FakeCatalog::with_manicure(true), false);
    let booking = harness
        .service
        .create_booking_as_of(None, request(), today())
        .await
        .unwrap_or_else(|error| panic!("booking should be created: {error}"));

    let result = harness
        .service
        .update_status(&customer_user("ana-1"), booking.id, BookingStatus::Cancelled)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn status_update_of_missing_booking_is_not_found() {
    let harness = harness(FakeCatalog::with_manicure(true), false);

    let result = harness
        .service
        .update_status(&staff_user(), BookingId::new(), BookingStatus::Confirmed)
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn owner_and_managers_can_read_a_booking() {
    let harness = harness(FakeCatalog::with_manicure(true), false);
    let actor = customer_user("ana-1");
    let booking = harness
        .service
        .create_booking_as_of(Some(&actor.identity), request(), today())
        .await
        .unwrap_or_else(|error| panic!("booking should be created: {error}"));

    assert!(harness.service.get_booking(&actor, booking.id).await.is_ok());
    assert!(harness
        .service
        .get_booking(&staff_user(), booking.id)
        .await
        .is_ok());
    assert!(matches!(
        harness
            .service
            .get_booking(&customer_user("someone-else"), booking.id)
            .await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn resend_failure_surfaces_generic_internal_error() {
    let harness = harness(FakeCatalog::with_manicure(true), false);
    let booking = harness
        .service
        .create_booking_as_of(None, request(), today())
        .await
        .unwrap_or_else(|error| panic!("booking should be created: {error}"));

    // Fresh harness sharing the booking store, but with a failing transport.
    let failing_transport = Arc::new(FakeEmailService {
        fail: true,
        ..FakeEmailService::default()
    });
    let notifications =
        NotificationService::new(failing_transport, Arc::new(FakeEmailLog::default()));
    let failing_service = BookingService::new(
        harness.catalog.clone(),
        harness.bookings.clone(),
        harness.profiles.clone(),
        notifications,
    );

    let result = failing_service
        .resend_confirmation(&staff_user(), booking.id)
        .await;

    match result {
        Err(AppError::Internal(message)) => {
            assert_eq!(message, "failed to resend confirmation email");
        }
        other => panic!("expected internal error, got {other:?}"),
    }
}

#[tokio::test]
async fn resend_succeeds_for_booking_manager() {
    let harness = harness(FakeCatalog::with_manicure(true), false);
    let booking = harness
        .service
        .create_booking_as_of(None, request(), today())
        .await
        .unwrap_or_else(|error| panic!("booking should be created: {error}"));

    let result = harness
        .service
        .resend_confirmation(&staff_user(), booking.id)
        .await;

    assert!(result.is_ok());
    assert_eq!(harness.transport.sent.lock().await.len(), 2);
}

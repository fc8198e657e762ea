//! Day-before reminder job.
//!
//! Each matching booking is processed in its own task so one bad email
//! address never blocks sibling deliveries. Only a failure in the query
//! stage propagates, handing the decision to retry to the scheduler.

use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use lumora_core::{AppError, AppResult};
use lumora_domain::{Booking, BookingStatus};
use tracing::{info, warn};

use crate::booking_ports::BookingRepository;
use crate::notification_ports::{DispatchOutcome, MessageKind};
use crate::notification_service::NotificationService;
use crate::profile_ports::ProfileRepository;


/// Per-run delivery counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderRunSummary {
    /// Reminders accepted by the transport.
    pub sent: u32,
    /// Bookings skipped (no recipient, or owner opted out).
    pub skipped: u32,
    /// Deliveries the transport rejected; each one is audit-logged.
    pub failed: u32,
}

/// Application service delivering reminders for tomorrow's confirmed
/// bookings.
#[derive(Clone)]
pub struct ReminderService {
    bookings: Arc<dyn BookingRepository>,
    profiles: Arc<dyn ProfileRepository>,
    notifications: NotificationService,
}

impl ReminderService {
    /// Creates a reminder service from its collaborator ports.
    #[must_use]
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        profiles: Arc<dyn ProfileRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            bookings,
            profiles,
            notifications,
        }
    }

    /// Runs the job for the current local calendar day.
    pub async fn run(&self) -> AppResult<ReminderRunSummary> {
        self.run_for(Local::now().date_naive()).await
    }

    /// Runs the job treating `today` as the current calendar day.
    ///
    /// Queries confirmed bookings dated tomorrow and attempts one reminder
    /// per booking, concurrently and independently. Per-booking failures
    /// are counted, never propagated; a query failure propagates so the
    /// scheduler's retry budget applies to systemic errors only.
    pub async fn run_for(&self, today: NaiveDate) -> AppResult<ReminderRunSummary> {
        let tomorrow = today
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AppError::Internal("calendar overflow computing tomorrow".to_owned()))?;

        let due = self
            .bookings
            .list_by_date_and_status(tomorrow, BookingStatus::Confirmed)
            .await?;

        info!(date = %tomorrow, count = due.len(), "processing reminder candidates");

        let mut handles = Vec::with_capacity(due.len());
        for booking in due {
            let service = self.clone();
            handles.push(tokio::spawn(
                async move { service.remind_one(booking).await },
            ));
        }

        let mut summary = ReminderRunSummary::default();
        for handle in handles {
            match handle.await {
                Ok(DispatchOutcome::Sent) => summary.sent = summary.sent.saturating_add(1),
                Ok(DispatchOutcome::Skipped) => {
                    summary.skipped = summary.skipped.saturating_add(1);
                }
                Ok(DispatchOutcome::Failed) => summary.failed = summary.failed.saturating_add(1),
                Err(join_error) => {
                    warn!(error = %join_error, "reminder task panicked");
                    summary.failed = summary.failed.saturating_add(1);
                }
            }
        }

        info!(
            sent = summary.sent,
            skipped = summary.skipped,
            failed = summary.failed,
            "reminder run finished"
        );

        Ok(summary)
    }

    async fn remind_one(&self, booking: Booking) -> DispatchOutcome {
        if booking.customer_email.is_none() {
            warn!(
                booking_id = %booking.id,
                "skipping reminder: booking has no customer email"
            );
            return DispatchOutcome::Skipped;
        }

        if let Some(owner_uid) = booking.owner_uid.as_deref() {
            match self.profiles.find_by_uid(owner_uid).await {
                Ok(Some(profile)) if !profile.notification_preferences.email_reminders => {
                    info!(
                        booking_id = %booking.id,
                        owner_uid,
                        "skipping reminder: owner opted out"
                    );
                    return DispatchOutcome::Skipped;
                }
                Ok(_) => {}
                Err(error) => {
                    // Preference lookup failure must not cost the customer
                    // their reminder.
                    warn!(
                        booking_id = %booking.id,
                        owner_uid,
                        error = %error,
                        "failed to load owner profile for reminder preferences"
                    );
                }
            }
        }

        self.notifications
            .dispatch(MessageKind::Reminder, &booking)
            .await
    }
}

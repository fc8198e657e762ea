//! Email rendering and fire-and-log dispatch.
//!
//! [`NotificationService::dispatch`] is the fire-and-log path: a delivery
//! failure is audit-logged and reported in the outcome, never propagated.
//! [`NotificationService::deliver`] propagates, and exists solely for the
//! manual resend operation whose only job is the send itself.

use std::sync::Arc;

use lumora_core::{AppError, AppResult};
use lumora_domain::Booking;
use tracing::warn;

use crate::notification_ports::{
    DispatchOutcome, EmailLogEntry, EmailLogRepository, EmailService, MessageKind,
};

/// Renders booking emails and hands them to the transport, writing one
/// audit entry per delivery attempt.
#[derive(Clone)]
pub struct NotificationService {
    email_service: Arc<dyn EmailService>,
    email_log: Arc<dyn EmailLogRepository>,
}

impl NotificationService {
    /// Creates a notification service over a transport and an audit log.
    #[must_use]
    pub fn new(email_service: Arc<dyn EmailService>, email_log: Arc<dyn EmailLogRepository>) -> Self {
        Self {
            email_service,
            email_log,
        }
    }

    /// Attempts one delivery, swallowing failure.
    ///
    /// Losing a notification must never block or roll back the booking
    /// operation that triggered it, so errors end in the audit log and the
    /// returned outcome only.
    pub async fn dispatch(&self, kind: MessageKind, booking: &Booking) -> DispatchOutcome {
        let Some(recipient) = booking.customer_email.clone() else {
            warn!(
                booking_id = %booking.id,
                kind = kind.as_str(),
                "skipping email: booking has no customer email"
            );
            return DispatchOutcome::Skipped;
        };

        match self.attempt(kind, booking, recipient.as_str()).await {
            Ok(()) => DispatchOutcome::Sent,
            Err(error) => {
                warn!(
                    booking_id = %booking.id,
                    kind = kind.as_str(),
                    error = %error,
                    "email delivery failed"
                );
                DispatchOutcome::Failed
            }
        }
    }

    /// Attempts one delivery, propagating failure to the caller.
    pub async fn deliver(&self, kind: MessageKind, booking: &Booking) -> AppResult<()> {
        let Some(recipient) = booking.customer_email.clone() else {
            return Err(AppError::FailedPrecondition(
                "booking has no customer email".to_owned(),
            ));
        };

        self.attempt(kind, booking, recipient.as_str()).await
    }

    async fn attempt(&self, kind: MessageKind, booking: &Booking, recipient: &str) -> AppResult<()> {
        let message = templates::render(kind, booking);
        let result = self
            .email_service
            .send_email(
                recipient,
                message.subject.as_str(),
                message.text_body.as_str(),
                Some(message.html_body.as_str()),
            )
            .await;

        let entry = EmailLogEntry {
            kind,
            recipient: recipient.to_owned(),
            booking_id: Some(booking.id),
            succeeded: result.is_ok(),
            error: result.as_ref().err().map(ToString::to_string),
        };
        if let Err(log_error) = self.email_log.append(entry).await {
            warn!(
                booking_id = %booking.id,
                error = %log_error,
                "failed to append email audit entry"
            );
        }

        result
    }
}

mod templates {
    use lumora_domain::{Booking, BookingStatus};

    use crate::notification_ports::{EmailMessage, MessageKind};

    /// Renders the subject and bodies for one message variant.
    pub(super) fn render(kind: MessageKind, booking: &Booking) -> EmailMessage {
        let date_text = booking.date.format("%A, %B %-d, %Y").to_string();
        let time_text = booking.time.format("%H:%M").to_string();

        let (subject, lead) = match kind {
            MessageKind::Confirmation => (
                format!("We received your booking for {date_text}"),
                format!(
                    "Thank you for booking with Lumora Salon. Your appointment on \
                     {date_text} at {time_text} is awaiting confirmation."
                ),
            ),
            MessageKind::StatusChange => match booking.status {
                BookingStatus::Confirmed => (
                    format!("Your appointment on {date_text} is confirmed"),
                    format!("See you on {date_text} at {time_text}."),
                ),
                BookingStatus::Cancelled => (
                    format!("Your appointment on {date_text} was cancelled"),
                    "If this was unexpected, please contact the salon.".to_owned(),
                ),
                BookingStatus::Completed => (
                    "Thank you for visiting Lumora Salon".to_owned(),
                    "We hope to see you again soon.".to_owned(),
                ),
                BookingStatus::Pending => (
                    format!("Your booking on {date_text} was updated"),
                    format!("Your appointment on {date_text} at {time_text} is awaiting confirmation."),
                ),
            },
            MessageKind::Reminder => (
                format!("Reminder: your appointment tomorrow at {time_text}"),
                format!(
                    "This is a friendly reminder of your appointment on {date_text} at {time_text}."
                ),
            ),
        };

        let mut text_lines = Vec::with_capacity(booking.lines.len());
        let mut html_items = String::new();
        for line in &booking.lines {
            let label = match line.subservice_name.as_deref() {
                Some(subservice) => format!("{} — {}", line.service_name, subservice),
                None => line.service_name.clone(),
            };
            text_lines.push(format!(
                "  - {label}: {} ({} min)",
                line.price, line.duration_minutes
            ));
            html_items.push_str(&format!(
                "<li>{label}: {} ({} min)</li>",
                line.price, line.duration_minutes
            ));
        }

        let text_body = format!(
            "Hi {name},\n\n{lead}\n\nYour services:\n{services}\n\nTotal: {total} ({minutes} min)\n\nLumora Salon",
            name = booking.customer_name,
            services = text_lines.join("\n"),
            total = booking.total_price,
            minutes = booking.total_duration_minutes,
        );

        let html_body = format!(
            "<p>Hi {name},</p><p>{lead}</p><ul>{html_items}</ul>\
             <p><strong>Total: {total} ({minutes} min)</strong></p><p>Lumora Salon</p>",
            name = booking.customer_name,
            total = booking.total_price,
            minutes = booking.total_duration_minutes,
        );

        EmailMessage {
            subject,
            text_body,
            html_body,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use lumora_core::{AppError, AppResult};
    use lumora_domain::{
        Booking, BookingId, BookingStatus, EmailAddress, Price, PricedLine, ServiceId,
    };
    use tokio::sync::Mutex;

    use super::NotificationService;
    use crate::notification_ports::{
        DispatchOutcome, EmailLogEntry, EmailLogRepository, EmailService, MessageKind,
    };

    #[derive(Default)]
    struct FakeEmailService {
        fail: bool,
        sent: Mutex<Vec<(String, String)>>,
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
            self.sent
                .lock()
                .await
                .push((to.to_owned(), subject.to_owned()));
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

    fn booking(with_email: bool) -> Booking {
        Booking {
            id: BookingId::new(),
            customer_name: "Ana Gomez".to_owned(),
            customer_email: if with_email {
                EmailAddress::new("ana@example.com").ok()
            } else {
                None
            },
            customer_phone: None,
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap_or_default(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            lines: vec![PricedLine {
                service_id: ServiceId::new("manicure-basic"),
                service_name: "Basic Manicure".to_owned(),
                subservice_id: None,
                subservice_name: None,
                price: Price::from_cents(2000),
                duration_minutes: 30,
            }],
            total_price: Price::from_cents(2000),
            total_duration_minutes: 30,
            notes: None,
            status: BookingStatus::Pending,
            owner_uid: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn successful_dispatch_appends_success_entry() {
        let log = Arc::new(FakeEmailLog::default());
        let service = NotificationService::new(Arc::new(FakeEmailService::default()), log.clone());

        let outcome = service
            .dispatch(MessageKind::Confirmation, &booking(true))
            .await;

        assert_eq!(outcome, DispatchOutcome::Sent);
        let entries = log.entries.lock().await;
        assert_eq!(entries.len(), 1);
        assert!(entries[0].succeeded);
        assert_eq!(entries[0].recipient, "ana@example.com");
    }

    #[tokio::test]
    async fn failed_dispatch_is_swallowed_and_audit_logged() {
        let log = Arc::new(FakeEmailLog::default());
        let transport = Arc::new(FakeEmailService {
            fail: true,
            ..FakeEmailService::default()
        });
        let service = NotificationService::new(transport, log.clone());

        let outcome = service
            .dispatch(MessageKind::Confirmation, &booking(true))
            .await;

        assert_eq!(outcome, DispatchOutcome::Failed);
        let entries = log.entries.lock().await;
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].succeeded);
        assert!(entries[0].error.as_deref().is_some_and(|error| error.contains("smtp")));
    }

    #[tokio::test]
    async fn dispatch_without_recipient_is_skipped_without_audit_entry() {
        let log = Arc::new(FakeEmailLog::default());
        let service = NotificationService::new(Arc::new(FakeEmailService::default()), log.clone());

        let outcome = service.dispatch(MessageKind::Reminder, &booking(false)).await;

        assert_eq!(outcome, DispatchOutcome::Skipped);
        assert!(log.entries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn deliver_propagates_transport_failure() {
        let log = Arc::new(FakeEmailLog::default());
        let transport = Arc::new(FakeEmailService {
            fail: true,
            ..FakeEmailService::default()
        });
        let service = NotificationService::new(transport, log.clone());

        let result = service.deliver(MessageKind::Confirmation, &booking(true)).await;

        assert!(result.is_err());
        // The attempt is still audit-logged.
        assert_eq!(log.entries.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn deliver_without_recipient_is_failed_precondition() {
        let service = NotificationService::new(
            Arc::new(FakeEmailService::default()),
            Arc::new(FakeEmailLog::default()),
        );

        let result = service.deliver(MessageKind::Confirmation, &booking(false)).await;
        assert!(matches!(result, Err(AppError::FailedPrecondition(_))));
    }

    #[tokio::test]
    async fn confirmation_subject_carries_booking_date() {
        let transport = Arc::new(FakeEmailService::default());
        let service =
            NotificationService::new(transport.clone(), Arc::new(FakeEmailLog::default()));

        service.dispatch(MessageKind::Confirmation, &booking(true)).await;

        let sent = transport.sent.lock().await;
        assert!(sent[0].1.contains("March 14, 2026"), "subject: {}", sent[0].1);
    }

    #[tokio::test]
    async fn cancelled_status_change_renders_cancellation_subject() {
        let transport = Arc::new(FakeEmailService::default());
        let service =
            NotificationService::new(transport.clone(), Arc::new(FakeEmailLog::default()));
        let mut cancelled = booking(true);
        cancelled.status = BookingStatus::Cancelled;

        service.dispatch(MessageKind::StatusChange, &cancelled).await;

        let sent = transport.sent.lock().await;
        assert!(sent[0].1.contains("cancelled"), "subject: {}", sent[0].1);
    }
}

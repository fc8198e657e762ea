use async_trait::async_trait;
use lumora_core::AppResult;
use lumora_domain::BookingId;
use serde::{Deserialize, Serialize};

/// Port for sending emails. Infrastructure provides SMTP or console
/// implementations.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends a plain-text or HTML email.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()>;
}

/// The message variants this system delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Sent right after a booking is created.
    Confirmation,
    /// Sent after a booking's status changes.
    StatusChange,
    /// Sent the day before a confirmed appointment.
    Reminder,
}

impl MessageKind {
    /// Returns the stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmation => "confirmation",
            Self::StatusChange => "status_change",
            Self::Reminder => "reminder",
        }
    }
}

/// A rendered email ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text_body: String,
    /// HTML body.
    pub html_body: String,
}

/// Result of one fire-and-log dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The transport accepted the message.
    Sent,
    /// No delivery was attempted (no recipient or opted out).
    Skipped,
    /// The transport rejected the message; the failure was audit-logged.
    Failed,
}

/// One append-only audit record of an attempted delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailLogEntry {
    /// Which message variant was attempted.
    pub kind: MessageKind,
    /// Recipient address.
    pub recipient: String,
    /// Booking the message belongs to.
    pub booking_id: Option<BookingId>,
    /// Whether the transport accepted the message.
    pub succeeded: bool,
    /// Failure reason when delivery failed.
    pub error: Option<String>,
}

/// Port for persisting delivery audit records. Write-only: nothing in this
/// system reads the entries back.
#[async_trait]
pub trait EmailLogRepository: Send + Sync {
    /// Persists one audit entry.
    async fn append(&self, entry: EmailLogEntry) -> AppResult<()>;
}

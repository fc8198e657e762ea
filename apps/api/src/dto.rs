use chrono::SecondsFormat;
use lumora_domain::{
    AuthClaims, Booking, NotificationPreferences, Permissions, PricedLine, Service, Subservice,
    UserProfile,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API error payload with optional per-field detail.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<Vec<FieldErrorResponse>>,
}

/// One rejected input field.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/field-error-response.ts"
)]
pub struct FieldErrorResponse {
    pub path: String,
    pub message: String,
}

/// API representation of a bookable subservice.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/subservice-response.ts"
)]
pub struct SubserviceResponse {
    pub id: String,
    pub name: String,
    pub price: String,
    pub duration_minutes: u32,
}

/// API representation of a bookable service.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/service-response.ts"
)]
pub struct ServiceResponse {
    pub id: String,
    pub name: String,
    pub price: String,
    pub duration_minutes: u32,
    pub subservices: Vec<SubserviceResponse>,
}

impl From<Service> for ServiceResponse {
    fn from(service: Service) -> Self {
        Self {
            id: service.id.to_string(),
            name: service.name,
            price: service.price.to_string(),
            duration_minutes: service.duration_minutes,
            subservices: service
                .subservices
                .into_iter()
                .filter(|subservice| subservice.active)
                .map(SubserviceResponse::from)
                .collect(),
        }
    }
}

impl From<Subservice> for SubserviceResponse {
    fn from(subservice: Subservice) -> Self {
        Self {
            id: subservice.id.to_string(),
            name: subservice.name,
            price: subservice.price.to_string(),
            duration_minutes: subservice.duration_minutes,
        }
    }
}

/// One requested (service, optional subservice) pair.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/service-selection-request.ts"
)]
pub struct ServiceSelectionRequest {
    pub service_id: String,
    #[serde(default)]
    pub subservice_id: Option<String>,
}

/// Incoming payload for booking creation.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-booking-request.ts"
)]
pub struct CreateBookingRequest {
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub date: String,
    pub time: String,
    pub services: Vec<ServiceSelectionRequest>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Response for booking creation.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-booking-response.ts"
)]
pub struct CreateBookingResponse {
    pub success: bool,
    pub booking_id: String,
}

/// One recomputed booking line.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/booking-line-response.ts"
)]
pub struct BookingLineResponse {
    pub service_id: String,
    pub service_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subservice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subservice_name: Option<String>,
    pub price: String,
    pub duration_minutes: u32,
}

impl From<PricedLine> for BookingLineResponse {
    fn from(line: PricedLine) -> Self {
        Self {
            service_id: line.service_id.to_string(),
            service_name: line.service_name,
            subservice_id: line.subservice_id.map(|id| id.to_string()),
            subservice_name: line.subservice_name,
            price: line.price.to_string(),
            duration_minutes: line.duration_minutes,
        }
    }
}

/// API representation of a booking record.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/booking-response.ts"
)]
pub struct BookingResponse {
    pub id: String,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    pub date: String,
    pub time: String,
    pub lines: Vec<BookingLineResponse>,
    pub total_price: String,
    pub total_duration_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_uid: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id.to_string(),
            customer_name: booking.customer_name,
            customer_email: booking.customer_email.map(String::from),
            customer_phone: booking.customer_phone,
            date: booking.date.format("%Y-%m-%d").to_string(),
            time: booking.time.format("%H:%M").to_string(),
            lines: booking
                .lines
                .into_iter()
                .map(BookingLineResponse::from)
                .collect(),
            total_price: booking.total_price.to_string(),
            total_duration_minutes: booking.total_duration_minutes,
            notes: booking.notes,
            status: booking.status.as_str().to_owned(),
            owner_uid: booking.owner_uid,
            created_at: booking
                .created_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            updated_at: booking
                .updated_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Incoming payload for a booking status update.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-booking-status-request.ts"
)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
}

/// Response for a booking status update.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-booking-status-response.ts"
)]
pub struct UpdateBookingStatusResponse {
    pub success: bool,
    pub booking_id: String,
    pub status: String,
}

/// Response for the manual confirmation resend.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/resend-confirmation-response.ts"
)]
pub struct ResendConfirmationResponse {
    pub success: bool,
}

/// Capability flags payload.
#[derive(Debug, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permissions-payload.ts"
)]
pub struct PermissionsPayload {
    #[serde(default)]
    pub manage_bookings: bool,
    #[serde(default)]
    pub manage_services: bool,
    #[serde(default)]
    pub manage_users: bool,
    #[serde(default)]
    pub view_reports: bool,
}

impl From<Permissions> for PermissionsPayload {
    fn from(permissions: Permissions) -> Self {
        Self {
            manage_bookings: permissions.manage_bookings,
            manage_services: permissions.manage_services,
            manage_users: permissions.manage_users,
            view_reports: permissions.view_reports,
        }
    }
}

impl From<PermissionsPayload> for Permissions {
    fn from(payload: PermissionsPayload) -> Self {
        Self {
            manage_bookings: payload.manage_bookings,
            manage_services: payload.manage_services,
            manage_users: payload.manage_users,
            view_reports: payload.view_reports,
        }
    }
}

/// Notification opt-outs payload.
#[derive(Debug, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/notification-preferences-payload.ts"
)]
pub struct NotificationPreferencesPayload {
    pub email_confirmations: bool,
    pub email_reminders: bool,
}

impl From<NotificationPreferences> for NotificationPreferencesPayload {
    fn from(preferences: NotificationPreferences) -> Self {
        Self {
            email_confirmations: preferences.email_confirmations,
            email_reminders: preferences.email_reminders,
        }
    }
}

impl From<NotificationPreferencesPayload> for NotificationPreferences {
    fn from(payload: NotificationPreferencesPayload) -> Self {
        Self {
            email_confirmations: payload.email_confirmations,
            email_reminders: payload.email_reminders,
        }
    }
}

/// Incoming payload for a profile update.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-profile-request.ts"
)]
pub struct UpdateProfileRequest {
    pub email: String,
    pub display_name: String,
    pub role: String,
    #[serde(default)]
    pub permissions: Option<PermissionsPayload>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub notification_preferences: Option<NotificationPreferencesPayload>,
}

/// API representation of a user profile.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/profile-response.ts"
)]
pub struct ProfileResponse {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub permissions: PermissionsPayload,
    pub active: bool,
    pub notification_preferences: NotificationPreferencesPayload,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            uid: profile.uid,
            email: profile.email,
            display_name: profile.display_name,
            role: profile.role.as_str().to_owned(),
            permissions: PermissionsPayload::from(profile.permissions),
            active: profile.active,
            notification_preferences: NotificationPreferencesPayload::from(
                profile.notification_preferences,
            ),
            created_at: profile
                .created_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            updated_at: profile
                .updated_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Incoming payload for a manual claims refresh.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/refresh-claims-request.ts"
)]
pub struct RefreshClaimsRequest {
    #[serde(default)]
    pub uid: Option<String>,
}

/// Claims returned to the caller after a manual refresh.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/claims-response.ts"
)]
pub struct ClaimsResponse {
    pub role: String,
    pub permissions: PermissionsPayload,
    pub last_updated: i64,
}

impl From<AuthClaims> for ClaimsResponse {
    fn from(claims: AuthClaims) -> Self {
        Self {
            role: claims.role.as_str().to_owned(),
            permissions: PermissionsPayload::from(claims.permissions),
            last_updated: claims.last_updated_ms,
        }
    }
}

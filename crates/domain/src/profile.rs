//! User profiles, roles, capability flags, and derived auth claims.
//!
//! The profile record is the source of truth for role and permissions; the
//! auth provider's custom claims are a derived, eventually-consistent cache
//! mirrored from it by the claims synchronizer.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lumora_core::AppError;
use serde::{Deserialize, Serialize};

/// Role assigned to a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full administrative access.
    Admin,
    /// Salon manager: bookings, services, users.
    Manager,
    /// Staff member: booking management.
    Staff,
    /// Regular customer.
    Customer,
    /// Student customer, booked at discounted rates.
    Student,
}

impl UserRole {
    /// Returns the stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Staff => "staff",
            Self::Customer => "customer",
            Self::Student => "student",
        }
    }

    /// Returns whether this role may manage bookings by itself.
    #[must_use]
    pub fn manages_bookings(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager | Self::Staff)
    }

    /// Returns whether this role may manage other users by itself.
    #[must_use]
    pub fn manages_users(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "staff" => Ok(Self::Staff),
            "customer" => Ok(Self::Customer),
            "student" => Ok(Self::Student),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}

/// Boolean capability flags granted to a profile on top of its role.
///
/// Struct equality is the structural, order-independent comparison the
/// claims synchronizer relies on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    /// May create, update, and view all bookings.
    #[serde(default)]
    pub manage_bookings: bool,
    /// May edit the service catalog.
    #[serde(default)]
    pub manage_services: bool,
    /// May edit other user profiles and roles.
    #[serde(default)]
    pub manage_users: bool,
    /// May view business reports.
    #[serde(default)]
    pub view_reports: bool,
}

impl Permissions {
    /// Returns the default capability set for a role.
    #[must_use]
    pub fn for_role(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self {
                manage_bookings: true,
                manage_services: true,
                manage_users: true,
                view_reports: true,
            },
            UserRole::Manager => Self {
                manage_bookings: true,
                manage_services: true,
                manage_users: true,
                view_reports: true,
            },
            UserRole::Staff => Self {
                manage_bookings: true,
                manage_services: false,
                manage_users: false,
                view_reports: false,
            },
            UserRole::Customer | UserRole::Student => Self::default(),
        }
    }
}

/// Per-channel notification opt-outs on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    /// Receive booking confirmation emails.
    #[serde(default = "default_on")]
    pub email_confirmations: bool,
    /// Receive day-before reminder emails.
    #[serde(default = "default_on")]
    pub email_reminders: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_confirmations: true,
            email_reminders: true,
        }
    }
}

fn default_on() -> bool {
    true
}

/// A user profile record, the source of truth for role and permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Stable auth-provider subject.
    pub uid: String,
    /// Contact email.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Assigned role.
    pub role: UserRole,
    /// Capability flags on top of the role.
    #[serde(default)]
    pub permissions: Permissions,
    /// Whether the account is active.
    #[serde(default = "default_on")]
    pub active: bool,
    /// Notification opt-outs.
    #[serde(default)]
    pub notification_preferences: NotificationPreferences,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Server-assigned last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Derived claims blob mirrored into the auth provider for one user.
///
/// Clients see a new value only after refreshing their session token, so
/// claims are eventually consistent with the profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthClaims {
    /// Mirrored role.
    pub role: UserRole,
    /// Mirrored capability flags.
    pub permissions: Permissions,
    /// When the claims were last written, in epoch milliseconds.
    #[serde(rename = "lastUpdated")]
    pub last_updated_ms: i64,
}

impl AuthClaims {
    /// Derives claims from a profile record.
    #[must_use]
    pub fn from_profile(profile: &UserProfile, now_ms: i64) -> Self {
        Self {
            role: profile.role,
            permissions: profile.permissions,
            last_updated_ms: now_ms,
        }
    }

    /// Returns whether these claims allow booking management.
    #[must_use]
    pub fn can_manage_bookings(&self) -> bool {
        self.role.manages_bookings() || self.permissions.manage_bookings
    }

    /// Returns whether these claims allow managing other users.
    #[must_use]
    pub fn can_manage_users(&self) -> bool {
        self.role.manages_users() || self.permissions.manage_users
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthClaims, Permissions, UserRole};

    #[test]
    fn role_roundtrips_storage_value() {
        for role in [
            UserRole::Admin,
            UserRole::Manager,
            UserRole::Staff,
            UserRole::Customer,
            UserRole::Student,
        ] {
            let restored = role.as_str().parse::<UserRole>();
            assert_eq!(restored.ok(), Some(role));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn staff_role_manages_bookings_but_not_users() {
        assert!(UserRole::Staff.manages_bookings());
        assert!(!UserRole::Staff.manages_users());
    }

    #[test]
    fn customer_claims_with_granted_flag_manage_bookings() {
        let claims = AuthClaims {
            role: UserRole::Customer,
            permissions: Permissions {
                manage_bookings: true,
                ..Permissions::default()
            },
            last_updated_ms: 0,
        };
        assert!(claims.can_manage_bookings());
        assert!(!claims.can_manage_users());
    }

    #[test]
    fn permissions_comparison_is_structural() {
        let left = Permissions::for_role(UserRole::Staff);
        let right = Permissions {
            manage_bookings: true,
            manage_services: false,
            manage_users: false,
            view_reports: false,
        };
        assert_eq!(left, right);
    }

    #[test]
    fn claims_serialize_with_last_updated_field() {
        let claims = AuthClaims {
            role: UserRole::Admin,
            permissions: Permissions::for_role(UserRole::Admin),
            last_updated_ms: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&claims).unwrap_or_default();
        assert_eq!(json["role"], "admin");
        assert_eq!(json["lastUpdated"], 1_700_000_000_000_i64);
        assert_eq!(json["permissions"]["manageBookings"], true);
    }
}

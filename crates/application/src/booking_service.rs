//! Booking use-cases: creation, retrieval, status updates, manual resend.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use lumora_core::{AppError, AppResult, UserIdentity};
use lumora_domain::{
    Booking, BookingId, BookingRequest, BookingStatus, validate_booking_request,
};
use tracing::{info, warn};

use crate::auth_ports::AuthenticatedUser;
use crate::booking_ports::{BookingRepository, NewBooking};
use crate::catalog_ports::CatalogRepository;
use crate::notification_ports::MessageKind;
use crate::notification_service::NotificationService;
use crate::pricing::price_selections;
use crate::profile_ports::ProfileRepository;

#[cfg(test)]
mod tests;

/// Application service for the booking lifecycle.
#[derive(Clone)]
pub struct BookingService {
    catalog: Arc<dyn CatalogRepository>,
    bookings: Arc<dyn BookingRepository>,
    profiles: Arc<dyn ProfileRepository>,
    notifications: NotificationService,
}

impl BookingService {
    /// Creates a booking service from its collaborator ports.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        bookings: Arc<dyn BookingRepository>,
        profiles: Arc<dyn ProfileRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            catalog,
            bookings,
            profiles,
            notifications,
        }
    }

    /// Validates, prices, and persists a new booking, then sends the
    /// confirmation email best-effort.
    ///
    /// Anonymous callers are permitted; the booking is stored without an
    /// owner. The record is created with status `pending` and totals
    /// recomputed from the catalog, never from the request.
    pub async fn create_booking(
        &self,
        actor: Option<&UserIdentity>,
        request: BookingRequest,
    ) -> AppResult<Booking> {
        self.create_booking_as_of(actor, request, Local::now().date_naive())
            .await
    }

    pub(crate) async fn create_booking_as_of(
        &self,
        actor: Option<&UserIdentity>,
        request: BookingRequest,
        today: NaiveDate,
    ) -> AppResult<Booking> {
        let valid = validate_booking_request(&request, today).map_err(AppError::InvalidRequest)?;
        let quote = price_selections(self.catalog.as_ref(), &valid.services).await?;

        let booking = self
            .bookings
            .create(NewBooking {
                customer_name: valid.customer_name,
                customer_email: valid.customer_email,
                customer_phone: valid.customer_phone,
                date: valid.date,
                time: valid.time,
                lines: quote.lines,
                total_price: quote.total_price,
                total_duration_minutes: quote.total_duration_minutes,
                notes: valid.notes,
                owner_uid: actor.map(|identity| identity.subject().to_owned()),
            })
            .await?;

        info!(
            booking_id = %booking.id,
            date = %booking.date,
            total = %booking.total_price,
            "booking created"
        );

        if self.confirmations_enabled_for(&booking).await {
            self.notifications
                .dispatch(MessageKind::Confirmation, &booking)
                .await;
        } else {
            info!(
                booking_id = %booking.id,
                "confirmation email suppressed by owner preference"
            );
        }

        Ok(booking)
    }

    /// Returns one booking, visible to its owner and to booking managers.
    pub async fn get_booking(
        &self,
        actor: &AuthenticatedUser,
        id: BookingId,
    ) -> AppResult<Booking> {
        let booking = self
            .bookings
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("booking '{id}' does not exist")))?;

        let is_owner = booking.owner_uid.as_deref() == Some(actor.identity.subject());
        if !is_owner && !actor.claims.can_manage_bookings() {
            return Err(AppError::Forbidden(
                "viewing this booking requires booking management access".to_owned(),
            ));
        }

        Ok(booking)
    }

    /// Writes a new status and sends the status-change email best-effort.
    ///
    /// Status transitions are unconstrained: any status may follow any
    /// other. The write happens before the email attempt, and a delivery
    /// failure never rolls the write back.
    pub async fn update_status(
        &self,
        actor: &AuthenticatedUser,
        id: BookingId,
        status: BookingStatus,
    ) -> AppResult<Booking> {
        self.require_booking_manager(actor)?;

        let updated = self.bookings.update_status(id, status).await?;
        info!(
            booking_id = %updated.id,
            status = status.as_str(),
            actor = actor.identity.subject(),
            "booking status updated"
        );

        self.notifications
            .dispatch(MessageKind::StatusChange, &updated)
            .await;

        Ok(updated)
    }

    /// Re-sends the confirmation email for an existing booking.
    ///
    /// This operation's only job is the send, so delivery failure surfaces
    /// as an internal error; the generic message avoids leaking transport
    /// detail, which lands in the audit log instead.
    pub async fn resend_confirmation(
        &self,
        actor: &AuthenticatedUser,
        id: BookingId,
    ) -> AppResult<()> {
        self.require_booking_manager(actor)?;

        let booking = self
            .bookings
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("booking '{id}' does not exist")))?;

        self.notifications
            .deliver(MessageKind::Confirmation, &booking)
            .await
            .map_err(|error| {
                warn!(booking_id = %id, error = %error, "manual confirmation resend failed");
                AppError::Internal("failed to resend confirmation email".to_owned())
            })
    }

    fn require_booking_manager(&self, actor: &AuthenticatedUser) -> AppResult<()> {
        if actor.claims.can_manage_bookings() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "this operation requires booking management access".to_owned(),
            ))
        }
    }

    async fn confirmations_enabled_for(&self, booking: &Booking) -> bool {
        let Some(owner_uid) = booking.owner_uid.as_deref() else {
            return true;
        };

        match self.profiles.find_by_uid(owner_uid).await {
            Ok(Some(profile)) => profile.notification_preferences.email_confirmations,
            Ok(None) => true,
            Err(error) => {
                // Preference lookup failure must not cost the customer
                // their confirmation email.
                warn!(
                    owner_uid,
                    error = %error,
                    "failed to load owner profile for notification preferences"
                );
                true
            }
        }
    }
}

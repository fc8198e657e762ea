use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use lumora_application::AuthenticatedUser;
use lumora_domain::{
    BookingId, BookingRequest, BookingStatus, ServiceId, ServiceSelection, SubserviceId,
};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::dto::{
    BookingResponse, CreateBookingRequest, CreateBookingResponse, ResendConfirmationResponse,
    UpdateBookingStatusRequest, UpdateBookingStatusResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_booking_handler(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateBookingRequest>,
) -> ApiResult<(StatusCode, Json<CreateBookingResponse>)> {
    let request = BookingRequest {
        customer_name: payload.customer_name,
        customer_email: payload.customer_email,
        customer_phone: payload.customer_phone,
        date: payload.date,
        time: payload.time,
        services: payload
            .services
            .into_iter()
            .map(|selection| ServiceSelection {
                service_id: ServiceId::new(selection.service_id),
                subservice_id: selection.subservice_id.map(SubserviceId::new),
            })
            .collect(),
        notes: payload.notes,
    };

    let actor = current.0.as_ref().map(|user| &user.identity);
    let booking = state.booking_service.create_booking(actor, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            success: true,
            booking_id: booking.id.to_string(),
        }),
    ))
}

pub async fn get_booking_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BookingResponse>> {
    let booking = state
        .booking_service
        .get_booking(&user, BookingId::from_uuid(id))
        .await?;

    Ok(Json(BookingResponse::from(booking)))
}

pub async fn update_booking_status_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> ApiResult<Json<UpdateBookingStatusResponse>> {
    let status: BookingStatus = payload.status.parse()?;
    let updated = state
        .booking_service
        .update_status(&user, BookingId::from_uuid(id), status)
        .await?;

    Ok(Json(UpdateBookingStatusResponse {
        success: true,
        booking_id: updated.id.to_string(),
        status: updated.status.as_str().to_owned(),
    }))
}

pub async fn resend_confirmation_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ResendConfirmationResponse>> {
    state
        .booking_service
        .resend_confirmation(&user, BookingId::from_uuid(id))
        .await?;

    Ok(Json(ResendConfirmationResponse { success: true }))
}

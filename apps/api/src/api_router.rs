use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use lumora_core::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, handlers};

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/bookings/{booking_id}",
            get(handlers::bookings::get_booking_handler),
        )
        .route(
            "/api/bookings/{booking_id}/status",
            put(handlers::bookings::update_booking_status_handler),
        )
        .route(
            "/api/bookings/{booking_id}/resend-confirmation",
            post(handlers::bookings::resend_confirmation_handler),
        )
        .route(
            "/api/profiles/{uid}",
            get(handlers::profiles::get_profile_handler)
                .put(handlers::profiles::update_profile_handler),
        )
        .route(
            "/api/claims/refresh",
            post(handlers::claims::refresh_claims_handler),
        )
        .route_layer(from_fn(auth::require_user));

    let cors_origin = frontend_url
        .parse::<HeaderValue>()
        .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

    let cors_layer = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    let router = Router::new()
        .route("/api/health", get(handlers::health::health_handler))
        .route(
            "/api/services",
            get(handlers::catalog::list_services_handler),
        )
        .route(
            "/api/bookings",
            post(handlers::bookings::create_booking_handler),
        )
        .merge(protected_routes)
        .layer(from_fn_with_state(
            app_state.clone(),
            auth::resolve_identity,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state);

    Ok(router)
}

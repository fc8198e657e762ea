//! Development seed data: a small catalog and an admin profile.

use lumora_core::{AppError, AppResult};
use lumora_domain::{Price, Service, ServiceId, Subservice, SubserviceId};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::info;

const DEV_SEED_ADMIN_UID: &str = "dev-admin";
const DEV_SEED_ADMIN_EMAIL: &str = "admin@lumora.local";
const DEV_SEED_ADMIN_DISPLAY_NAME: &str = "Salon Admin";

pub async fn run(pool: &PgPool) -> AppResult<()> {
    for (order, service) in seed_services().into_iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO services (id, name, price, duration_minutes, active, display_order, subservices)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(service.id.as_str())
        .bind(service.name.as_str())
        .bind(service.price.to_string())
        .bind(i32::try_from(service.duration_minutes).unwrap_or(i32::MAX))
        .bind(service.active)
        .bind(i32::try_from(order).unwrap_or(i32::MAX))
        .bind(Json(service.subservices.clone()))
        .execute(pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to seed service: {error}")))?;
    }

    sqlx::query(
        r#"
        INSERT INTO user_profiles (uid, email, display_name, role, permissions, active, notification_preferences)
        VALUES ($1, $2, $3, 'admin',
                '{"manageBookings": true, "manageServices": true, "manageUsers": true, "viewReports": true}'::jsonb,
                TRUE, '{}'::jsonb)
        ON CONFLICT (uid) DO NOTHING
        "#,
    )
    .bind(DEV_SEED_ADMIN_UID)
    .bind(DEV_SEED_ADMIN_EMAIL)
    .bind(DEV_SEED_ADMIN_DISPLAY_NAME)
    .execute(pool)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed admin profile: {error}")))?;

    info!("dev seed data applied");
    Ok(())
}

fn seed_services() -> Vec<Service> {
    vec![
        Service {
            id: ServiceId::new("manicure-basic"),
            name: "Basic Manicure".to_owned(),
            price: Price::from_cents(2000),
            duration_minutes: 30,
            active: true,
            subservices: vec![
                Subservice {
                    id: SubserviceId::new("gel-finish"),
                    name: "Gel Finish".to_owned(),
                    price: Price::from_cents(1500),
                    duration_minutes: 15,
                    active: true,
                },
                Subservice {
                    id: SubserviceId::new("nail-art"),
                    name: "Nail Art".to_owned(),
                    price: Price::from_cents(2500),
                    duration_minutes: 20,
                    active: true,
                },
            ],
        },
        Service {
            id: ServiceId::new("pedicure-spa"),
            name: "Spa Pedicure".to_owned(),
            price: Price::from_cents(3500),
            duration_minutes: 45,
            active: true,
            subservices: Vec::new(),
        },
        Service {
            id: ServiceId::new("facial-deluxe"),
            name: "Deluxe Facial".to_owned(),
            price: Price::from_cents(5500),
            duration_minutes: 60,
            // Kept inactive so the precondition path is visible in dev.
            active: false,
            subservices: Vec::new(),
        },
    ]
}

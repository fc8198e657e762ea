//! Server-side recomputation of booking price and duration.
//!
//! Totals derive exclusively from catalog values read at call time; any
//! price or duration the client attached to the request never flows in.

use lumora_core::{AppError, AppResult};
use lumora_domain::{Price, PricedLine, ServiceSelection};

use crate::catalog_ports::CatalogRepository;

/// Authoritative totals recomputed from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Per-selection recomputed lines, in request order.
    pub lines: Vec<PricedLine>,
    /// Sum of line prices.
    pub total_price: Price,
    /// Sum of line durations in minutes.
    pub total_duration_minutes: u32,
}

/// Recomputes price and duration for every requested selection.
///
/// Errors with `NotFound` when a referenced service or subservice does not
/// exist and `FailedPrecondition` when it exists but is inactive.
pub async fn price_selections(
    catalog: &dyn CatalogRepository,
    selections: &[ServiceSelection],
) -> AppResult<Quote> {
    let mut lines = Vec::with_capacity(selections.len());

    for selection in selections {
        let service = catalog
            .find_service(&selection.service_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "service '{}' does not exist",
                    selection.service_id
                ))
            })?;

        if !service.active {
            return Err(AppError::FailedPrecondition(format!(
                "service '{}' is not currently bookable",
                selection.service_id
            )));
        }

        let mut price = service.price;
        let mut duration_minutes = service.duration_minutes;
        let mut subservice_name = None;

        if let Some(subservice_id) = &selection.subservice_id {
            let subservice = service.find_subservice(subservice_id).ok_or_else(|| {
                AppError::NotFound(format!(
                    "subservice '{subservice_id}' does not exist in service '{}'",
                    selection.service_id
                ))
            })?;

            if !subservice.active {
                return Err(AppError::FailedPrecondition(format!(
                    "subservice '{subservice_id}' is not currently bookable"
                )));
            }

            price = price + subservice.price;
            duration_minutes = duration_minutes.saturating_add(subservice.duration_minutes);
            subservice_name = Some(subservice.name.clone());
        }

        lines.push(PricedLine {
            service_id: selection.service_id.clone(),
            service_name: service.name.clone(),
            subservice_id: selection.subservice_id.clone(),
            subservice_name,
            price,
            duration_minutes,
        });
    }

    let total_price = lines.iter().map(|line| line.price).sum();
    let total_duration_minutes = lines
        .iter()
        .fold(0_u32, |total, line| total.saturating_add(line.duration_minutes));

    Ok(Quote {
        lines,
        total_price,
        total_duration_minutes,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use lumora_core::{AppError, AppResult};
    use lumora_domain::{Price, Service, ServiceId, ServiceSelection, Subservice, SubserviceId};

    use super::price_selections;
    use crate::catalog_ports::CatalogRepository;

    struct FakeCatalog {
        services: HashMap<ServiceId, Service>,
    }

    #[async_trait]
    impl CatalogRepository for FakeCatalog {
        async fn find_service(&self, id: &ServiceId) -> AppResult<Option<Service>> {
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

    fn catalog() -> FakeCatalog {
        let manicure = Service {
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
                    active: false,
                },
            ],
        };
        let facial = Service {
            id: ServiceId::new("facial-deluxe"),
            name: "Deluxe Facial".to_owned(),
            price: Price::from_cents(5550),
            duration_minutes: 60,
            active: false,
            subservices: Vec::new(),
        };

        FakeCatalog {
            services: HashMap::from([
                (manicure.id.clone(), manicure),
                (facial.id.clone(), facial),
            ]),
        }
    }

    fn selection(service: &str, subservice: Option<&str>) -> ServiceSelection {
        ServiceSelection {
            service_id: ServiceId::new(service),
            subservice_id: subservice.map(SubserviceId::new),
        }
    }

    #[tokio::test]
    async fn sums_service_and_subservice_values() {
        let quote = price_selections(
            &catalog(),
            &[
                selection("manicure-basic", None),
                selection("manicure-basic", Some("gel-finish")),
            ],
        )
        .await
        .unwrap_or_else(|error| panic!("quote should succeed: {error}"));

        assert_eq!(quote.lines.len(), 2);
        assert_eq!(quote.lines[0].price.cents(), 2000);
        assert_eq!(quote.lines[1].price.cents(), 3500);
        assert_eq!(quote.total_price.to_string(), "$55.00");
        assert_eq!(quote.total_duration_minutes, 75);
    }

    #[tokio::test]
    async fn line_carries_names_read_from_catalog() {
        let quote = price_selections(&catalog(), &[selection("manicure-basic", Some("gel-finish"))])
            .await
            .unwrap_or_else(|error| panic!("quote should succeed: {error}"));

        assert_eq!(quote.lines[0].service_name, "Basic Manicure");
        assert_eq!(quote.lines[0].subservice_name.as_deref(), Some("Gel Finish"));
    }

    #[tokio::test]
    async fn unknown_service_is_not_found() {
        let result = price_selections(&catalog(), &[selection("haircut", None)]).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn inactive_service_is_failed_precondition() {
        let result = price_selections(&catalog(), &[selection("facial-deluxe", None)]).await;
        assert!(matches!(result, Err(AppError::FailedPrecondition(_))));
    }

    #[tokio::test]
    async fn unknown_subservice_is_not_found() {
        let result =
            price_selections(&catalog(), &[selection("manicure-basic", Some("massage"))]).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn inactive_subservice_is_failed_precondition() {
        let result =
            price_selections(&catalog(), &[selection("manicure-basic", Some("nail-art"))]).await;
        assert!(matches!(result, Err(AppError::FailedPrecondition(_))));
    }
}

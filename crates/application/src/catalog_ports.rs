use async_trait::async_trait;
use lumora_core::AppResult;
use lumora_domain::{Service, ServiceId};

/// Repository port for the read-only service catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Returns one service by identifier, with its nested subservices.
    async fn find_service(&self, id: &ServiceId) -> AppResult<Option<Service>>;

    /// Lists services currently open for booking.
    async fn list_active_services(&self) -> AppResult<Vec<Service>>;
}

use std::sync::Arc;

use lumora_application::{
    BookingService, CatalogRepository, ClaimsSyncService, ProfileRepository, TokenVerifier,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub booking_service: BookingService,
    pub claims_service: ClaimsSyncService,
    pub catalog_repository: Arc<dyn CatalogRepository>,
    pub profile_repository: Arc<dyn ProfileRepository>,
    pub token_verifier: Arc<dyn TokenVerifier>,
}

use axum::Json;
use axum::extract::State;

use crate::dto::ServiceResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_services_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ServiceResponse>>> {
    let services = state
        .catalog_repository
        .list_active_services()
        .await?
        .into_iter()
        .map(ServiceResponse::from)
        .collect();

    Ok(Json(services))
}

use axum::Json;
use axum::extract::{Extension, State};
use lumora_application::AuthenticatedUser;

use crate::dto::{ClaimsResponse, RefreshClaimsRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn refresh_claims_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<RefreshClaimsRequest>,
) -> ApiResult<Json<ClaimsResponse>> {
    let claims = state
        .claims_service
        .refresh_claims(&user, payload.uid.as_deref())
        .await?;

    Ok(Json(ClaimsResponse::from(claims)))
}

//! Bearer-token authentication middleware.
//!
//! Every request passes through [`resolve_identity`], which verifies a
//! presented token against the auth provider and attaches the result.
//! Protected routes additionally pass through [`require_user`], which
//! rejects anonymous callers.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use lumora_application::AuthenticatedUser;
use lumora_core::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// The caller resolved for this request, anonymous when no token was sent.
#[derive(Clone)]
pub struct CurrentUser(pub Option<AuthenticatedUser>);

/// Resolves the caller identity from the `Authorization` header.
///
/// A missing header leaves the request anonymous; a present but invalid
/// token is rejected outright so a client with an expired session gets a
/// clear 401 instead of silently losing booking ownership.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let current = match bearer_token(&request) {
        None => None,
        Some(token) => {
            let verified = state.token_verifier.verify(token.as_str()).await?;
            match verified {
                Some(user) => Some(user),
                None => {
                    return Err(ApiError(AppError::Unauthenticated(
                        "invalid or expired token".to_owned(),
                    )));
                }
            }
        }
    };

    request.extensions_mut().insert(CurrentUser(current));
    Ok(next.run(request).await)
}

/// Rejects anonymous callers and attaches the verified user.
pub async fn require_user(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .and_then(|current| current.0.clone())
        .ok_or_else(|| {
            ApiError(AppError::Unauthenticated(
                "authentication required".to_owned(),
            ))
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
        .filter(|token| !token.is_empty())
}

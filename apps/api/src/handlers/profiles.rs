use axum::Json;
use axum::extract::{Extension, Path, State};
use chrono::Utc;
use lumora_application::{AuthenticatedUser, ProfileChangeEvent};
use lumora_core::AppError;
use lumora_domain::{NotificationPreferences, Permissions, UserProfile, UserRole};

use crate::dto::{ProfileResponse, UpdateProfileRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(uid): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    authorize_profile_access(&user, uid.as_str())?;

    let profile = state
        .profile_repository
        .find_by_uid(uid.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no profile found for user '{uid}'")))?;

    Ok(Json(ProfileResponse::from(profile)))
}

/// Persists a profile write and feeds the before/after pair to the claims
/// synchronizer, the explicit counterpart of a document-change trigger.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(uid): Path<String>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    authorize_profile_access(&user, uid.as_str())?;

    let before = state.profile_repository.find_by_uid(uid.as_str()).await?;

    let requested_role: UserRole = payload.role.parse()?;
    let requested_permissions = payload
        .permissions
        .map(Permissions::from)
        .unwrap_or_else(|| Permissions::for_role(requested_role));

    // Only user managers may touch role, permissions, or the active flag;
    // everyone else can edit their own contact and notification fields.
    if !user.claims.can_manage_users() {
        let current_role = before
            .as_ref()
            .map_or(UserRole::Customer, |profile| profile.role);
        let current_permissions = before
            .as_ref()
            .map_or_else(Permissions::default, |profile| profile.permissions);
        let current_active = before.as_ref().is_none_or(|profile| profile.active);

        if requested_role != current_role
            || requested_permissions != current_permissions
            || payload.active.unwrap_or(current_active) != current_active
        {
            return Err(AppError::Forbidden(
                "changing role or permissions requires user management access".to_owned(),
            )
            .into());
        }
    }

    let now = Utc::now();
    let profile = UserProfile {
        uid: uid.clone(),
        email: payload.email,
        display_name: payload.display_name,
        role: requested_role,
        permissions: requested_permissions,
        active: payload
            .active
            .unwrap_or_else(|| before.as_ref().is_none_or(|profile| profile.active)),
        notification_preferences: payload
            .notification_preferences
            .map(NotificationPreferences::from)
            .unwrap_or_else(|| {
                before
                    .as_ref()
                    .map_or_else(NotificationPreferences::default, |profile| {
                        profile.notification_preferences
                    })
            }),
        created_at: before.as_ref().map_or(now, |profile| profile.created_at),
        updated_at: now,
    };

    let after = state.profile_repository.save(profile).await?;

    state
        .claims_service
        .profile_written(ProfileChangeEvent {
            actor: user.identity.subject().to_owned(),
            before,
            after: after.clone(),
        })
        .await;

    Ok(Json(ProfileResponse::from(after)))
}

fn authorize_profile_access(user: &AuthenticatedUser, uid: &str) -> Result<(), AppError> {
    if uid == user.identity.subject() || user.claims.can_manage_users() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "accessing another user's profile requires user management access".to_owned(),
        ))
    }
}

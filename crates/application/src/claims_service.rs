//! Synchronizes auth-provider claims with profile records.
//!
//! The profile record is the source of truth; claims are a derived cache.
//! The sync handler fires on every profile write and short-circuits when
//! neither role nor permissions changed, so no-op writes cause no claim
//! churn and no audit noise.

use std::sync::Arc;

use chrono::Utc;
use lumora_core::{AppError, AppResult};
use lumora_domain::{AuthClaims, UserProfile, UserRole};
use tracing::{info, warn};

use crate::auth_ports::{AuthenticatedUser, ClaimsWriter, SystemLogEntry, SystemLogRepository};
use crate::profile_ports::ProfileRepository;


/// The before/after pair delivered for one profile write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileChangeEvent {
    /// Subject that performed the profile write.
    pub actor: String,
    /// Record state before the write, absent on creation.
    pub before: Option<UserProfile>,
    /// Record state after the write.
    pub after: UserProfile,
}

/// Result of one synchronization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Role and permissions were unchanged; nothing was written.
    Unchanged,
    /// Claims were overwritten and an audit entry appended.
    Updated,
    /// The claims write failed; the failure was audit-logged.
    Failed,
}

/// Application service mirroring profile role/permissions into auth claims.
#[derive(Clone)]
pub struct ClaimsSyncService {
    profiles: Arc<dyn ProfileRepository>,
    claims_writer: Arc<dyn ClaimsWriter>,
    system_log: Arc<dyn SystemLogRepository>,
}

impl ClaimsSyncService {
    /// Creates a claims synchronizer from its collaborator ports.
    #[must_use]
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        claims_writer: Arc<dyn ClaimsWriter>,
        system_log: Arc<dyn SystemLogRepository>,
    ) -> Self {
        Self {
            profiles,
            claims_writer,
            system_log,
        }
    }

    /// Handles one profile write.
    ///
    /// Failures to write claims are swallowed after audit-logging: the
    /// surrounding trigger infrastructure owns retries, not this service.
    pub async fn profile_written(&self, event: ProfileChangeEvent) -> SyncOutcome {
        let changed = event.before.as_ref().is_none_or(|before| {
            before.role != event.after.role || before.permissions != event.after.permissions
        });

        if !changed {
            return SyncOutcome::Unchanged;
        }

        let old_role = event.before.as_ref().map(|before| before.role);
        let claims = AuthClaims::from_profile(&event.after, Utc::now().timestamp_millis());

        match self
            .claims_writer
            .set_claims(event.after.uid.as_str(), &claims)
            .await
        {
            Ok(()) => {
                info!(
                    uid = event.after.uid,
                    old_role = old_role.map(|role| role.as_str()),
                    new_role = event.after.role.as_str(),
                    "auth claims updated"
                );
                self.append_log(
                    event.after.uid.as_str(),
                    event.actor.as_str(),
                    old_role,
                    event.after.role,
                    None,
                )
                .await;
                SyncOutcome::Updated
            }
            Err(error) => {
                warn!(
                    uid = event.after.uid,
                    error = %error,
                    "failed to write auth claims"
                );
                self.append_log(
                    event.after.uid.as_str(),
                    event.actor.as_str(),
                    old_role,
                    event.after.role,
                    Some(error.to_string()),
                )
                .await;
                SyncOutcome::Failed
            }
        }
    }

    /// Re-derives and writes claims for a user from its current profile.
    ///
    /// Callers always refresh themselves freely; refreshing another user
    /// requires user management access. Returns the written claims so the
    /// client can confirm what its next token refresh will carry.
    pub async fn refresh_claims(
        &self,
        actor: &AuthenticatedUser,
        target_uid: Option<&str>,
    ) -> AppResult<AuthClaims> {
        let target = target_uid.unwrap_or_else(|| actor.identity.subject());

        if target != actor.identity.subject() && !actor.claims.can_manage_users() {
            return Err(AppError::Forbidden(
                "refreshing another user's claims requires user management access".to_owned(),
            ));
        }

        let profile = self
            .profiles
            .find_by_uid(target)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no profile found for user '{target}'")))?;

        let claims = AuthClaims::from_profile(&profile, Utc::now().timestamp_millis());

        match self
            .claims_writer
            .set_claims(profile.uid.as_str(), &claims)
            .await
        {
            Ok(()) => {
                self.append_log(
                    profile.uid.as_str(),
                    actor.identity.subject(),
                    Some(profile.role),
                    profile.role,
                    None,
                )
                .await;
                Ok(claims)
            }
            Err(error) => {
                self.append_log(
                    profile.uid.as_str(),
                    actor.identity.subject(),
                    Some(profile.role),
                    profile.role,
                    Some(error.to_string()),
                )
                .await;
                Err(error)
            }
        }
    }

    async fn append_log(
        &self,
        uid: &str,
        actor: &str,
        old_role: Option<UserRole>,
        new_role: UserRole,
        error: Option<String>,
    ) {
        let entry = SystemLogEntry {
            uid: uid.to_owned(),
            actor: actor.to_owned(),
            old_role,
            new_role,
            succeeded: error.is_none(),
            error,
        };

        if let Err(log_error) = self.system_log.append(entry).await {
            warn!(uid, error = %log_error, "failed to append claims audit entry");
        }
    }
}

use async_trait::async_trait;
use lumora_core::{AppResult, UserIdentity};
use lumora_domain::{AuthClaims, UserRole};

/// A verified caller: identity plus the claims attached to its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Verified identity.
    pub identity: UserIdentity,
    /// Claims carried by the presented token.
    pub claims: AuthClaims,
}

/// Privileged port for overwriting a user's custom claims at the auth
/// provider. Claims become visible to the client only after it refreshes
/// its session token.
#[async_trait]
pub trait ClaimsWriter: Send + Sync {
    /// Overwrites the claims blob for one user.
    async fn set_claims(&self, uid: &str, claims: &AuthClaims) -> AppResult<()>;
}

/// Port for verifying inbound bearer tokens against the auth provider.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verifies a token. Returns `None` for an invalid or expired token.
    async fn verify(&self, token: &str) -> AppResult<Option<AuthenticatedUser>>;
}

/// One append-only audit record of an attempted claims update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemLogEntry {
    /// User whose claims were written.
    pub uid: String,
    /// Subject that triggered the update.
    pub actor: String,
    /// Role before the update, absent when the profile was just created.
    pub old_role: Option<UserRole>,
    /// Role after the update.
    pub new_role: UserRole,
    /// Whether the claims write succeeded.
    pub succeeded: bool,
    /// Failure reason when the write failed.
    pub error: Option<String>,
}

/// Port for persisting claim-update audit records. Write-only: nothing in
/// this system reads the entries back.
#[async_trait]
pub trait SystemLogRepository: Send + Sync {
    /// Persists one audit entry.
    async fn append(&self, entry: SystemLogEntry) -> AppResult<()>;
}

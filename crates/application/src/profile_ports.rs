use async_trait::async_trait;
use lumora_core::AppResult;
use lumora_domain::UserProfile;

/// Repository port for user profile persistence.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Returns the profile for an auth-provider subject.
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<UserProfile>>;

    /// Inserts or updates a profile, returning the stored record with
    /// server-assigned timestamps.
    async fn save(&self, profile: UserProfile) -> AppResult<UserProfile>;
}

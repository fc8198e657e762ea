//! HTTP client for the external auth provider.
//!
//! The provider owns credentials and session tokens; this system only
//! verifies inbound bearer tokens and overwrites per-user custom claims
//! with a privileged service identity.

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};

use lumora_application::{AuthenticatedUser, ClaimsWriter, TokenVerifier};
use lumora_core::{AppError, AppResult, UserIdentity};
use lumora_domain::{AuthClaims, Permissions, UserRole};

/// Auth provider endpoint configuration.
#[derive(Clone)]
pub struct AuthProviderConfig {
    /// Base URL of the provider API, without a trailing slash.
    pub base_url: String,
    /// Privileged service token for claims writes.
    pub service_token: String,
}

/// Auth provider client over HTTP.
#[derive(Clone)]
pub struct HttpAuthProviderClient {
    http_client: reqwest::Client,
    config: AuthProviderConfig,
}

impl HttpAuthProviderClient {
    /// Creates a client from a shared HTTP client and configuration.
    #[must_use]
    pub fn new(http_client: reqwest::Client, config: AuthProviderConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[derive(Debug, Serialize)]
struct VerifyTokenRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyTokenResponse {
    uid: String,
    display_name: String,
    email: Option<String>,
    claims: Option<AuthClaims>,
}

#[async_trait]
impl TokenVerifier for HttpAuthProviderClient {
    async fn verify(&self, token: &str) -> AppResult<Option<AuthenticatedUser>> {
        let endpoint = format!("{}/v1/tokens/verify", self.config.base_url);
        let response = self
            .http_client
            .post(endpoint)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.service_token),
            )
            .json(&VerifyTokenRequest { token })
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to call token verify endpoint: {error}"))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "token verify endpoint returned status {}: {body}",
                status.as_u16()
            )));
        }

        let verified = response.json::<VerifyTokenResponse>().await.map_err(|error| {
            AppError::Internal(format!("failed to parse token verify response: {error}"))
        })?;

        // Tokens minted before the first claims sync carry no custom claims.
        let claims = verified.claims.unwrap_or(AuthClaims {
            role: UserRole::Customer,
            permissions: Permissions::default(),
            last_updated_ms: 0,
        });

        Ok(Some(AuthenticatedUser {
            identity: UserIdentity::new(verified.uid, verified.display_name, verified.email),
            claims,
        }))
    }
}

#[async_trait]
impl ClaimsWriter for HttpAuthProviderClient {
    async fn set_claims(&self, uid: &str, claims: &AuthClaims) -> AppResult<()> {
        let endpoint = format!("{}/v1/users/{uid}/claims", self.config.base_url);
        let response = self
            .http_client
            .put(endpoint)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.service_token),
            )
            .json(claims)
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to call claims endpoint: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "claims endpoint returned status {}: {body}",
                status.as_u16()
            )));
        }

        Ok(())
    }
}

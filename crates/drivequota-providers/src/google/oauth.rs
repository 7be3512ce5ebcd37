//! OAuth 2.0 token refresh against Google's token endpoint.
//!
//! Only the refresh grant lives here; the consent flow that produces the
//! first refresh token happens outside drivequota and its result is
//! imported with `drivequota accounts link`.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{FetchResult, QuotaError};

use super::config::OAuthCredentials;
use super::request_error;

/// Successful token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Only present when Google rotates the refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Client for the refresh grant.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    token_url: String,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a client posting to `token_url` with a shared HTTP client.
    pub fn new(
        credentials: OAuthCredentials,
        token_url: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            credentials,
            token_url: token_url.into(),
            http_client,
        }
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// A 400 or 401 from the endpoint means the refresh token was revoked
    /// or the client credentials are wrong, and maps to
    /// [`ProviderAuthFailure`](crate::QuotaErrorKind::ProviderAuthFailure).
    pub async fn refresh_token(&self, refresh_token: &str) -> FetchResult<TokenResponse> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        debug!(url = %self.token_url, "refreshing access token");
        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            QuotaError::network(format!("failed to read token response: {}", e)).with_source(e)
        })?;

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(QuotaError::auth_failure(format!(
                "token refresh failed ({}): {}",
                status,
                body.trim()
            )));
        }
        if !status.is_success() {
            return Err(QuotaError::provider(format!(
                "token endpoint error ({}): {}",
                status,
                body.trim()
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            QuotaError::malformed(format!("invalid token response: {}", e)).with_source(e)
        })?;
        if token.access_token.is_empty() {
            return Err(QuotaError::malformed("token response has an empty access_token"));
        }

        info!(
            rotated = token.refresh_token.is_some(),
            expires_in = ?token.expires_in,
            "refreshed access token"
        );
        Ok(token)
    }
}

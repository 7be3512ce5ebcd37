//! Per-account quota fetching with a single refresh-and-retry.

use std::sync::Arc;

use drivequota_core::{LinkedAccount, QuotaResult};
use tracing::{debug, info};

use crate::error::{FetchResult, QuotaError, QuotaErrorKind};
use crate::google::{self, DriveClient, GoogleConfig, OAuthClient};
use crate::store::{Credential, TokenStore};

/// Fetches the Drive storage quota of linked accounts.
///
/// Each call does at most one token refresh. The refresh happens either
/// before the first request, when the stored access token is known to be
/// expired, or after the quota endpoint answers 401. A refreshed credential
/// is written back to the store exactly once.
#[derive(Clone)]
pub struct QuotaFetcher {
    store: Arc<dyn TokenStore>,
    oauth: OAuthClient,
    drive: DriveClient,
}

impl std::fmt::Debug for QuotaFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaFetcher")
            .field("oauth", &self.oauth)
            .field("drive", &self.drive)
            .finish_non_exhaustive()
    }
}

impl QuotaFetcher {
    /// Creates a fetcher after validating `config`.
    pub fn new(config: GoogleConfig, store: Arc<dyn TokenStore>) -> FetchResult<Self> {
        config.validate().map_err(QuotaError::configuration)?;
        let http_client = google::http_client(&config)?;

        Ok(Self {
            store,
            oauth: OAuthClient::new(config.credentials, config.token_url, http_client.clone()),
            drive: DriveClient::new(config.quota_url, http_client),
        })
    }

    /// Returns the token store this fetcher reads from.
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Fetches the quota of one account.
    ///
    /// Errors are tagged with the account.
    pub async fn fetch(&self, account: &LinkedAccount) -> FetchResult<QuotaResult> {
        self.fetch_untagged(account)
            .await
            .map_err(|e| e.with_account(account))
    }

    async fn fetch_untagged(&self, account: &LinkedAccount) -> FetchResult<QuotaResult> {
        let mut credential = self
            .store
            .get_credential(account)?
            .ok_or_else(|| {
                QuotaError::missing_credential("no stored credential, link the account again")
            })?;

        let mut refreshed = false;
        if credential.is_expired() && credential.has_refresh_token() {
            debug!(account = %account, "access token expired, refreshing first");
            credential = self.refresh(account, credential).await?;
            refreshed = true;
        }

        let first = self.drive.storage_quota(&credential.access_token).await;
        match first {
            Err(e) if e.kind() == QuotaErrorKind::ProviderAuthFailure && !refreshed => {
                if !credential.has_refresh_token() {
                    return Err(QuotaError::missing_refresh_token(
                        "access token rejected and no refresh token is stored",
                    ));
                }
                debug!(account = %account, "access token rejected, refreshing");
                let credential = self.refresh(account, credential).await?;
                self.drive.storage_quota(&credential.access_token).await
            }
            result => result,
        }
    }

    /// Refreshes and persists the credential.
    async fn refresh(
        &self,
        account: &LinkedAccount,
        credential: Credential,
    ) -> FetchResult<Credential> {
        let refresh_token = credential
            .refresh_token
            .clone()
            .ok_or_else(|| QuotaError::missing_refresh_token("no refresh token is stored"))?;

        let response = self.oauth.refresh_token(&refresh_token).await?;
        let updated = credential.refreshed(response);
        self.store.save_credential(account, &updated)?;
        info!(account = %account, "access token refreshed");
        Ok(updated)
    }
}

//! Dashboard assembly over all linked accounts of a user.

use drivequota_core::{AccountQuota, Dashboard};
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::error::FetchResult;
use crate::fetcher::QuotaFetcher;

/// Builds quota dashboards.
#[derive(Debug, Clone)]
pub struct DashboardService {
    fetcher: QuotaFetcher,
}

impl DashboardService {
    pub fn new(fetcher: QuotaFetcher) -> Self {
        Self { fetcher }
    }

    /// Fetches every linked account of `user` concurrently and aggregates.
    ///
    /// A failing account becomes an error entry and does not count towards
    /// the total. Only a failure to list the accounts fails the whole call.
    pub async fn build(&self, user: &str) -> FetchResult<Dashboard> {
        let accounts = self.fetcher.store().list_accounts(user)?;
        debug!(user, accounts = accounts.len(), "building dashboard");

        let results = join_all(accounts.iter().map(|account| self.fetcher.fetch(account))).await;

        let items = accounts
            .into_iter()
            .zip(results)
            .map(|(account, result)| {
                let result = result.map_err(|e| {
                    warn!(
                        account = %account,
                        kind = %e.kind(),
                        "quota fetch failed: {}",
                        e.message()
                    );
                    if e.kind().needs_relink() {
                        format!("{} (re-link with `drivequota accounts link`)", e)
                    } else {
                        e.to_string()
                    }
                });
                AccountQuota::from_outcome(account, result)
            })
            .collect();

        Ok(Dashboard::new(items))
    }
}

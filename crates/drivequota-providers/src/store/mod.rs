//! Linked accounts and their OAuth credentials.
//!
//! The [`TokenStore`] trait is the only place the fetcher reads and writes
//! credentials. Two implementations ship with the crate:
//!
//! - [`FileTokenStore`]: one JSON file with `0600` permissions, written
//!   atomically
//! - [`MemoryTokenStore`]: in-process map, used by tests and dry runs

mod file;
mod memory;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use drivequota_core::{GOOGLE_PROVIDER, LinkedAccount};
use serde::{Deserialize, Serialize};

use crate::error::{FetchResult, QuotaError};
use crate::google::TokenResponse;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

/// Seconds taken off `expires_in` so tokens are refreshed before Google
/// starts rejecting them.
const EXPIRY_BUFFER_SECS: i64 = 60;

/// OAuth credential of one linked account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Short-lived token sent as `Authorization: Bearer`.
    pub access_token: String,

    /// Long-lived token exchanged for new access tokens.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// When the access token expires, if known.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,

    /// OAuth scopes granted at link time.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// When the access token was last obtained.
    pub last_refresh: DateTime<Utc>,
}

impl Credential {
    /// Creates a credential from token endpoint data.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.and_then(expiry_from_now),
            scopes: Vec::new(),
            last_refresh: Utc::now(),
        }
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Returns true if the access token is known to be expired.
    ///
    /// Credentials without an expiry are assumed valid until rejected.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Applies a successful refresh.
    ///
    /// The refresh token is only replaced when the endpoint issued a new one.
    /// Without a usable `expires_in` the previous expiry is dropped rather
    /// than kept, since it refers to the old access token.
    pub fn refreshed(mut self, response: TokenResponse) -> Self {
        self.access_token = response.access_token;
        if let Some(token) = response.refresh_token.filter(|t| !t.is_empty()) {
            self.refresh_token = Some(token);
        }
        self.expires_at = response.expires_in.and_then(expiry_from_now);
        self.last_refresh = Utc::now();
        self
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .field("last_refresh", &self.last_refresh)
            .finish()
    }
}

/// Expiry for a token valid for `secs` seconds, minus the buffer.
///
/// Negative lifetimes mean already expired. Lifetimes too large to
/// represent yield `None`, the same as an unknown expiry.
fn expiry_from_now(secs: i64) -> Option<DateTime<Utc>> {
    let lifetime = secs.max(0).saturating_sub(EXPIRY_BUFFER_SECS);
    Utc::now().checked_add_signed(TimeDelta::try_seconds(lifetime)?)
}

/// Storage for linked accounts and their credentials.
///
/// Implementations serialize their own writes; concurrent saves for the
/// same account are last-write-wins.
pub trait TokenStore: Send + Sync {
    /// Lists the Google accounts linked to `user`.
    fn list_accounts(&self, user: &str) -> FetchResult<Vec<LinkedAccount>>;

    /// Returns the credential of a linked account, if any.
    fn get_credential(&self, account: &LinkedAccount) -> FetchResult<Option<Credential>>;

    /// Replaces the credential of an already linked account.
    fn save_credential(&self, account: &LinkedAccount, credential: &Credential)
    -> FetchResult<()>;

    /// Links an account, replacing any previous credential for it.
    fn link(&self, account: LinkedAccount, credential: Credential) -> FetchResult<()>;

    /// Removes a linked account of `user` together with its credential.
    fn disconnect(&self, user: &str, account_id: &str) -> FetchResult<LinkedAccount>;
}

/// One stored account with its credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredAccount {
    account: LinkedAccount,
    credential: Credential,
}

/// The account table both stores operate on, keyed by [`LinkedAccount::key`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AccountTable {
    #[serde(default)]
    accounts: BTreeMap<String, StoredAccount>,
}

impl AccountTable {
    fn list(&self, user: &str) -> Vec<LinkedAccount> {
        self.accounts
            .values()
            .map(|stored| &stored.account)
            .filter(|account| account.user == user && account.provider == GOOGLE_PROVIDER)
            .cloned()
            .collect()
    }

    fn credential(&self, account: &LinkedAccount) -> Option<Credential> {
        self.accounts
            .get(&account.key())
            .map(|stored| stored.credential.clone())
    }

    fn save_credential(
        &mut self,
        account: &LinkedAccount,
        credential: &Credential,
    ) -> FetchResult<()> {
        let stored = self
            .accounts
            .get_mut(&account.key())
            .ok_or_else(|| QuotaError::not_found(format!("account {} is not linked", account)))?;
        stored.credential = credential.clone();
        Ok(())
    }

    fn link(&mut self, account: LinkedAccount, credential: Credential) {
        self.accounts.insert(
            account.key(),
            StoredAccount {
                account,
                credential,
            },
        );
    }

    fn disconnect(&mut self, user: &str, account_id: &str) -> FetchResult<LinkedAccount> {
        let key = LinkedAccount::google(user, account_id).key();
        self.accounts
            .remove(&key)
            .map(|stored| stored.account)
            .ok_or_else(|| {
                QuotaError::not_found(format!(
                    "no linked Google account {} for user {}",
                    account_id, user
                ))
            })
    }
}

fn lock_poisoned() -> QuotaError {
    QuotaError::storage("token store lock poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(refresh_token: Option<&str>, expires_in: Option<i64>) -> TokenResponse {
        TokenResponse {
            access_token: "new-access".to_string(),
            refresh_token: refresh_token.map(String::from),
            expires_in,
            token_type: Some("Bearer".to_string()),
        }
    }

    #[test]
    fn credential_expiry_has_buffer() {
        let credential = Credential::new("access", Some("refresh".to_string()), Some(3600));
        let expires_at = credential.expires_at.unwrap();
        let remaining = expires_at - Utc::now();
        assert!(remaining <= TimeDelta::seconds(3540));
        assert!(remaining > TimeDelta::seconds(3500));
        assert!(!credential.is_expired());
    }

    #[test]
    fn credential_without_expiry_is_not_expired() {
        let credential = Credential::new("access", None, None);
        assert!(!credential.is_expired());
        assert!(!credential.has_refresh_token());
    }

    #[test]
    fn credential_in_the_past_is_expired() {
        let mut credential = Credential::new("access", None, Some(3600));
        credential.expires_at = Some(Utc::now() - TimeDelta::hours(1));
        assert!(credential.is_expired());
    }

    #[test]
    fn refresh_keeps_old_refresh_token() {
        let credential = Credential::new("old", Some("refresh-1".to_string()), None);
        let updated = credential.refreshed(response(None, Some(3600)));
        assert_eq!(updated.access_token, "new-access");
        assert_eq!(updated.refresh_token.as_deref(), Some("refresh-1"));
        assert!(updated.expires_at.is_some());
    }

    #[test]
    fn refresh_replaces_refresh_token_when_issued() {
        let credential = Credential::new("old", Some("refresh-1".to_string()), Some(10));
        let updated = credential.refreshed(response(Some("refresh-2"), None));
        assert_eq!(updated.refresh_token.as_deref(), Some("refresh-2"));
        assert!(updated.expires_at.is_none());
    }

    #[test]
    fn out_of_range_lifetime_has_no_expiry() {
        let credential = Credential::new("access", None, Some(i64::MAX));
        assert!(credential.expires_at.is_none());
        assert!(!credential.is_expired());

        let credential = Credential::new("old", Some("r".to_string()), Some(3600));
        let updated = credential.refreshed(response(None, Some(1_000_000_000_000_000)));
        assert!(updated.expires_at.is_none());
        assert_eq!(updated.access_token, "new-access");
    }

    #[test]
    fn negative_lifetime_is_already_expired() {
        let credential = Credential::new("access", None, Some(-5));
        assert!(credential.is_expired());
    }

    #[test]
    fn debug_redacts_tokens() {
        let credential = Credential::new("secret-access", Some("secret-refresh".to_string()), None);
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn table_lists_only_users_google_accounts() {
        let mut table = AccountTable::default();
        table.link(
            LinkedAccount::google("alice", "2"),
            Credential::new("a", None, None),
        );
        table.link(
            LinkedAccount::google("alice", "1"),
            Credential::new("b", None, None),
        );
        table.link(
            LinkedAccount::google("bob", "3"),
            Credential::new("c", None, None),
        );
        let mut other = LinkedAccount::google("alice", "4");
        other.provider = "dropbox".to_string();
        table.link(other, Credential::new("d", None, None));

        let ids: Vec<_> = table
            .list("alice")
            .into_iter()
            .map(|a| a.account_id)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn table_disconnect_requires_ownership() {
        let mut table = AccountTable::default();
        table.link(
            LinkedAccount::google("alice", "1"),
            Credential::new("a", None, None),
        );

        let err = table.disconnect("bob", "1").unwrap_err();
        assert_eq!(err.kind(), crate::error::QuotaErrorKind::NotFound);
        assert_eq!(table.list("alice").len(), 1);

        let removed = table.disconnect("alice", "1").unwrap();
        assert_eq!(removed.account_id, "1");
        assert!(table.list("alice").is_empty());
    }

    #[test]
    fn table_keeps_accounts_with_slashes_apart() {
        let mut table = AccountTable::default();
        table.link(
            LinkedAccount::google("alice", "x/google/y"),
            Credential::new("alice-token", None, None),
        );
        table.link(
            LinkedAccount::google("alice/google/x", "y"),
            Credential::new("other-token", None, None),
        );

        let alice = table.list("alice");
        assert_eq!(alice.len(), 1);
        assert_eq!(
            table.credential(&alice[0]).unwrap().access_token,
            "alice-token"
        );
        assert_eq!(table.list("alice/google/x").len(), 1);
    }

    #[test]
    fn table_save_requires_linked_account() {
        let mut table = AccountTable::default();
        let account = LinkedAccount::google("alice", "1");
        let err = table
            .save_credential(&account, &Credential::new("a", None, None))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::QuotaErrorKind::NotFound);
    }
}

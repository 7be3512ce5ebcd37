//! In-memory token store.

use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use drivequota_core::LinkedAccount;

use super::{AccountTable, Credential, TokenStore, lock_poisoned};
use crate::error::FetchResult;

/// Token store that keeps everything in memory.
///
/// Counts [`save_credential`](TokenStore::save_credential) calls so callers
/// can check how often a refresh was persisted.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    table: RwLock<AccountTable>,
    credential_writes: AtomicUsize,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to link an account up front.
    pub fn with_account(self, account: LinkedAccount, credential: Credential) -> Self {
        if let Ok(mut table) = self.table.write() {
            table.link(account, credential);
        }
        self
    }

    /// Returns how many times a credential was saved after linking.
    pub fn credential_writes(&self) -> usize {
        self.credential_writes.load(Ordering::SeqCst)
    }
}

impl TokenStore for MemoryTokenStore {
    fn list_accounts(&self, user: &str) -> FetchResult<Vec<LinkedAccount>> {
        Ok(self.table.read().map_err(|_| lock_poisoned())?.list(user))
    }

    fn get_credential(&self, account: &LinkedAccount) -> FetchResult<Option<Credential>> {
        Ok(self
            .table
            .read()
            .map_err(|_| lock_poisoned())?
            .credential(account))
    }

    fn save_credential(
        &self,
        account: &LinkedAccount,
        credential: &Credential,
    ) -> FetchResult<()> {
        self.table
            .write()
            .map_err(|_| lock_poisoned())?
            .save_credential(account, credential)?;
        self.credential_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn link(&self, account: LinkedAccount, credential: Credential) -> FetchResult<()> {
        self.table
            .write()
            .map_err(|_| lock_poisoned())?
            .link(account, credential);
        Ok(())
    }

    fn disconnect(&self, user: &str, account_id: &str) -> FetchResult<LinkedAccount> {
        self.table
            .write()
            .map_err(|_| lock_poisoned())?
            .disconnect(user, account_id)
    }
}

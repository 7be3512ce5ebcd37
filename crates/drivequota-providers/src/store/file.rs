//! File-backed token store.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use drivequota_core::LinkedAccount;
use tracing::{debug, info};

use super::{AccountTable, Credential, TokenStore, lock_poisoned};
use crate::error::{FetchResult, QuotaError};

/// Token store persisted as a single JSON file.
///
/// Every change re-reads the file, applies itself to what is on disk and
/// rewrites it through a private temporary file and a rename, so readers
/// never see a partial file and accounts written by other processes survive.
/// The in-memory table only takes the change once it is on disk.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    table: RwLock<AccountTable>,
}

impl FileTokenStore {
    /// Opens the store at `path`, loading it if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> FetchResult<Self> {
        let path = path.into();
        let table = read_table(&path)?;
        Ok(Self {
            path,
            table: RwLock::new(table),
        })
    }

    /// Returns the default location: `$XDG_DATA_HOME/drivequota/accounts.json`.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("drivequota")
            .join("accounts.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to the current file contents and writes the result.
    ///
    /// Runs under the write lock, so changes from this process are
    /// serialized.
    fn update<T>(
        &self,
        change: impl FnOnce(&mut AccountTable) -> FetchResult<T>,
    ) -> FetchResult<T> {
        let mut table = self.table.write().map_err(|_| lock_poisoned())?;
        let mut next = read_table(&self.path)?;
        let value = change(&mut next)?;
        self.persist(&next)?;
        *table = next;
        Ok(value)
    }

    fn persist(&self, table: &AccountTable) -> FetchResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                QuotaError::storage(format!("failed to create token store directory: {}", e))
                    .with_source(e)
            })?;
        }

        let content = serde_json::to_string_pretty(table).map_err(|e| {
            QuotaError::storage(format!("failed to serialize token store: {}", e)).with_source(e)
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        write_private(&temp_path, &content).map_err(|e| {
            QuotaError::storage(format!("failed to write token store: {}", e)).with_source(e)
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            QuotaError::storage(format!("failed to rename token store: {}", e)).with_source(e)
        })?;

        debug!(path = %self.path.display(), "saved token store");
        Ok(())
    }
}

/// Reads the table at `path`; a missing file is an empty table.
fn read_table(path: &Path) -> FetchResult<AccountTable> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no token store yet");
            return Ok(AccountTable::default());
        }
        Err(e) => {
            return Err(QuotaError::storage(format!(
                "failed to read token store {}: {}",
                path.display(),
                e
            ))
            .with_source(e));
        }
    };

    let table: AccountTable = serde_json::from_str(&content).map_err(|e| {
        QuotaError::storage(format!(
            "failed to parse token store {}: {}",
            path.display(),
            e
        ))
        .with_source(e)
    })?;
    debug!(path = %path.display(), accounts = table.accounts.len(), "loaded token store");
    Ok(table)
}

/// Writes `content` to `path`, owner-only before any byte lands.
fn write_private(path: &Path, content: &str) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // `mode` only applies on creation; a leftover temp file keeps its bits.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(content.as_bytes())?;
    file.sync_all()
}

impl TokenStore for FileTokenStore {
    fn list_accounts(&self, user: &str) -> FetchResult<Vec<LinkedAccount>> {
        let table = self.table.read().map_err(|_| lock_poisoned())?;
        Ok(table.list(user))
    }

    fn get_credential(&self, account: &LinkedAccount) -> FetchResult<Option<Credential>> {
        let table = self.table.read().map_err(|_| lock_poisoned())?;
        Ok(table.credential(account))
    }

    fn save_credential(
        &self,
        account: &LinkedAccount,
        credential: &Credential,
    ) -> FetchResult<()> {
        self.update(|table| table.save_credential(account, credential))?;
        info!(account = %account, "stored refreshed credential");
        Ok(())
    }

    fn link(&self, account: LinkedAccount, credential: Credential) -> FetchResult<()> {
        let label = account.to_string();
        self.update(|table| {
            table.link(account, credential);
            Ok(())
        })?;
        info!(account = %label, "linked account");
        Ok(())
    }

    fn disconnect(&self, user: &str, account_id: &str) -> FetchResult<LinkedAccount> {
        let removed = self.update(|table| table.disconnect(user, account_id))?;
        info!(account = %removed, "disconnected account");
        Ok(removed)
    }
}

//! Linked account management: list, link, disconnect.

use std::path::Path;

use drivequota_core::{LinkedAccount, OutputFormat};
use drivequota_providers::{Credential, GoogleConfig, TokenStore};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ClientError, ClientResult};

/// Any of the Drive scopes grants read access to `about.storageQuota`.
const DRIVE_SCOPE_PREFIX: &str = "https://www.googleapis.com/auth/drive";

/// Tokens handed over by an OAuth consent flow, in the token endpoint's
/// JSON shape.
#[derive(Debug, Default, Deserialize)]
pub struct LinkTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Space-separated granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

impl LinkTokens {
    /// Reads a token response saved as JSON.
    pub fn from_file(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            ClientError::Input(format!("invalid token file {}: {}", path.display(), e))
        })
    }

    /// Builds link tokens from individual flags.
    pub fn from_flags(
        access_token: Option<String>,
        refresh_token: Option<String>,
        expires_in: Option<i64>,
    ) -> ClientResult<Self> {
        let access_token = access_token.ok_or_else(|| {
            ClientError::Input("--access-token or --token-file is required".to_string())
        })?;
        Ok(Self {
            access_token,
            refresh_token,
            expires_in,
            scope: None,
        })
    }

    fn into_credential(self) -> ClientResult<Credential> {
        if self.access_token.trim().is_empty() {
            return Err(ClientError::Input("access token is empty".to_string()));
        }
        let scopes = self
            .scope
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        Ok(
            Credential::new(self.access_token, self.refresh_token, self.expires_in)
                .with_scopes(scopes),
        )
    }
}

/// One row of `accounts list`.
#[derive(Debug, Serialize)]
struct AccountRow {
    #[serde(flatten)]
    account: LinkedAccount,
    has_refresh_token: bool,
    expired: bool,
}

/// Lists the linked accounts of `user`.
pub fn list(store: &dyn TokenStore, user: &str, format: OutputFormat) -> ClientResult<String> {
    let mut rows = Vec::new();
    for account in store.list_accounts(user)? {
        let credential = store.get_credential(&account)?;
        rows.push(AccountRow {
            has_refresh_token: credential.as_ref().is_some_and(Credential::has_refresh_token),
            expired: credential.as_ref().is_some_and(Credential::is_expired),
            account,
        });
    }

    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&rows)?);
    }

    if rows.is_empty() {
        return Ok(format!("No linked Google accounts for {}.", user));
    }

    let lines: Vec<String> = rows
        .iter()
        .map(|row| {
            let mut line = format!(
                "{}  {}",
                row.account.account_id,
                row.account.email.as_deref().unwrap_or("-")
            );
            if !row.has_refresh_token {
                line.push_str("  (no refresh token)");
            } else if row.expired {
                line.push_str("  (access token expired)");
            }
            line
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Links an account of `user`, replacing any previous credential for it.
pub fn link(
    store: &dyn TokenStore,
    user: &str,
    account_id: &str,
    email: Option<String>,
    tokens: LinkTokens,
) -> ClientResult<LinkedAccount> {
    if account_id.trim().is_empty() {
        return Err(ClientError::Input("account id is empty".to_string()));
    }

    let mut account = LinkedAccount::google(user, account_id);
    account.email = email;
    let credential = tokens.into_credential()?;

    if !credential.has_refresh_token() {
        info!(account = %account, "linking without refresh token; re-link when it expires");
    }
    if !credential.scopes.is_empty()
        && !credential.scopes.iter().any(|s| s.starts_with(DRIVE_SCOPE_PREFIX))
    {
        return Err(ClientError::Input(format!(
            "granted scopes do not include Drive access (need {})",
            GoogleConfig::DRIVE_SCOPE
        )));
    }

    store.link(account.clone(), credential)?;
    Ok(account)
}

/// Disconnects an account of `user`.
pub fn disconnect(
    store: &dyn TokenStore,
    user: &str,
    account_id: &str,
) -> ClientResult<LinkedAccount> {
    Ok(store.disconnect(user, account_id)?)
}

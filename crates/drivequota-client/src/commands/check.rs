//! Startup readiness check.
//!
//! Everything that needs network access goes through [`prepare`] first, so
//! a missing OAuth client or an unreadable token store is reported before
//! any request is made.

use std::sync::Arc;

use drivequota_providers::{FileTokenStore, GoogleConfig, TokenStore};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Validated provider configuration and opened token store.
#[derive(Debug)]
pub struct Ready {
    pub google: GoogleConfig,
    pub store: Arc<FileTokenStore>,
}

/// Validates the OAuth client configuration and endpoints, then opens the
/// token store.
pub fn prepare(config: &ClientConfig) -> ClientResult<Ready> {
    let google = config.google_config()?;
    let store = open_store(config)?;
    debug!(
        token_url = %google.token_url,
        quota_url = %google.quota_url,
        store = %store.path().display(),
        "configuration ready"
    );
    Ok(Ready { google, store })
}

/// Opens the token store named by the configuration.
pub fn open_store(config: &ClientConfig) -> ClientResult<Arc<FileTokenStore>> {
    Ok(Arc::new(FileTokenStore::open(config.store_path())?))
}

/// Runs the readiness check and returns the report.
pub fn check(config: &ClientConfig, user: &str) -> ClientResult<String> {
    let ready = prepare(config)?;
    let accounts = ready.store.list_accounts(user)?;

    let lines = [
        format!("OAuth client: {}", ready.google.credentials.client_id),
        format!("Token endpoint: {}", ready.google.token_url),
        format!("Quota endpoint: {}", ready.google.quota_url),
        format!("Timeout: {}s", ready.google.timeout.as_secs()),
        format!(
            "Token store: {} ({} linked account{} for {})",
            ready.store.path().display(),
            accounts.len(),
            if accounts.len() == 1 { "" } else { "s" },
            user
        ),
        "Ready.".to_string(),
    ];
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GoogleSettings, StoreSettings};
    use crate::error::ClientError;

    fn config_with_store(dir: &tempfile::TempDir) -> ClientConfig {
        ClientConfig {
            google: Some(GoogleSettings {
                client_id: Some("test.apps.googleusercontent.com".to_string()),
                client_secret: Some("secret".to_string()),
                ..Default::default()
            }),
            store: StoreSettings {
                path: Some(dir.path().join("accounts.json")),
            },
            ..Default::default()
        }
    }

    #[test]
    fn ready_with_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let report = check(&config_with_store(&dir), "alice").unwrap();
        assert!(report.contains("OAuth client: test.apps.googleusercontent.com"));
        assert!(report.contains("0 linked accounts for alice"));
        assert!(report.ends_with("Ready."));
    }

    #[test]
    fn missing_google_section_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_with_store(&dir);
        config.google = None;
        assert!(matches!(prepare(&config), Err(ClientError::Config(_))));
    }

    #[test]
    fn bad_endpoint_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_with_store(&dir);
        if let Some(ref mut google) = config.google {
            google.token_url = Some("nope".to_string());
        }
        let err = prepare(&config).unwrap_err();
        assert!(err.to_string().contains("token_url"));
    }

    #[test]
    fn unreadable_store_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_store(&dir);
        std::fs::write(config.store_path(), "garbage").unwrap();
        let err = prepare(&config).unwrap_err();
        assert!(matches!(err, ClientError::Quota(_)));
    }
}

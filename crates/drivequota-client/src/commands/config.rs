//! Configuration commands.

use std::path::{Path, PathBuf};

use drivequota_providers::OAuthCredentials;

use crate::commands::check;
use crate::config::{self, ClientConfig};
use crate::error::{ClientError, ClientResult};
use crate::secret::SecretRef;

/// Renders the effective configuration as TOML.
///
/// A plain-text client secret is masked; secret references are shown as
/// written.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<String> {
    let mut shown = config.clone();
    if let Some(ref mut google) = shown.google
        && let Some(ref secret) = google.client_secret
        && !SecretRef::parse(secret).is_reference()
    {
        google.client_secret = Some("********".to_string());
    }

    let toml_str = toml::to_string_pretty(&shown)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    Ok(format!("# config.toml ({})\n{}", path.display(), toml_str))
}

/// Validates the OAuth client, the endpoints and the token store.
pub fn validate(config: &ClientConfig) -> ClientResult<String> {
    check::prepare(config)?;
    Ok("Configuration is valid.".to_string())
}

/// Shows the configuration file and token store paths.
pub fn path(config: &ClientConfig, config_path: &Path) -> String {
    format!(
        "config: {}\nstore: {}",
        config_path.display(),
        config.store_path().display()
    )
}

/// Saves OAuth client credentials given directly or through a Google Cloud
/// Console credentials file.
pub fn set_credentials(
    config_path: &Path,
    client_id: Option<String>,
    client_secret: Option<String>,
    credentials_file: Option<PathBuf>,
) -> ClientResult<String> {
    let credentials = match (client_id, client_secret, credentials_file) {
        (Some(id), Some(secret), None) => OAuthCredentials::new(id, secret),
        (None, None, Some(file)) => {
            OAuthCredentials::from_file(&file).map_err(ClientError::Config)?
        }
        (None, None, None) => {
            return Err(ClientError::Input(
                "pass --client-id and --client-secret, or --credentials-file".to_string(),
            ));
        }
        _ => {
            return Err(ClientError::Input(
                "--credentials-file cannot be combined with --client-id/--client-secret, \
                 and both --client-id and --client-secret are needed"
                    .to_string(),
            ));
        }
    };

    // Secret references are checked when they are resolved, not here.
    if !SecretRef::parse(&credentials.client_id).is_reference() {
        credentials
            .validate()
            .map_err(|e| ClientError::Input(format!("invalid credentials: {}", e)))?;
    }

    config::save_credentials(
        config_path,
        &credentials.client_id,
        &credentials.client_secret,
    )?;
    Ok(format!("Saved Google credentials to {}", config_path.display()))
}

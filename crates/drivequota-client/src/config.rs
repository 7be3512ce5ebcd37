//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/drivequota/config.toml` by default.
//!
//! Credential values (`client_id`, `client_secret`) support secret
//! references, see [`crate::secret`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use drivequota_core::FormatOptions;
use drivequota_providers::{FileTokenStore, GoogleConfig, OAuthCredentials};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ClientError, ClientResult};

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the drivequota client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Local user whose accounts are shown. Defaults to `$USER`.
    pub user: Option<String>,

    /// Google OAuth client and endpoints.
    pub google: Option<GoogleSettings>,

    /// Display settings.
    pub display: DisplaySettings,

    /// Token store settings.
    pub store: StoreSettings,

    /// File this configuration was loaded from.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Display settings for dashboard rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Text shown when no account is linked.
    pub no_accounts_text: String,

    /// Show the Drive/trash usage breakdown.
    pub show_breakdown: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        let defaults = FormatOptions::default();
        Self {
            no_accounts_text: defaults.no_accounts_text,
            show_breakdown: defaults.show_breakdown,
        }
    }
}

impl DisplaySettings {
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            no_accounts_text: self.no_accounts_text.clone(),
            show_breakdown: self.show_breakdown,
        }
    }
}

/// Token store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path of the accounts file.
    pub path: Option<PathBuf>,
}

impl ClientConfig {
    /// Loads configuration from `path`, or defaults if the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self, String> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self {
                source: Some(path.to_path_buf()),
                ..Self::default()
            })
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Returns the file this configuration belongs to.
    pub fn config_path(&self) -> PathBuf {
        self.source.clone().unwrap_or_else(Self::default_path)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("drivequota")
    }

    /// Returns the token store path.
    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(FileTokenStore::default_path)
    }

    /// Returns the local user: the CLI value, then `user` from the file,
    /// then `$USER`/`$USERNAME`.
    pub fn effective_user(&self, cli_user: Option<&str>) -> ClientResult<String> {
        cli_user
            .map(str::to_string)
            .or_else(|| self.user.clone())
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .filter(|user| !user.trim().is_empty())
            .ok_or_else(|| {
                ClientError::Config("no user given; pass --user or set `user` in config.toml".into())
            })
    }

    /// Builds the provider configuration from the `[google]` section.
    pub fn google_config(&self) -> ClientResult<GoogleConfig> {
        let google = self.google.as_ref().ok_or_else(|| {
            ClientError::Config(format!(
                "no [google] section in {}; run: drivequota config set-credentials --credentials-file <path>",
                self.config_path().display()
            ))
        })?;
        google.to_provider_config().map_err(ClientError::Config)
    }
}

// ---------------------------------------------------------------------------
// GoogleSettings (in config.toml, including credentials)
// ---------------------------------------------------------------------------

/// Google provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GoogleSettings {
    /// OAuth client ID (supports secret references).
    pub client_id: Option<String>,

    /// OAuth client secret (supports secret references).
    pub client_secret: Option<String>,

    /// Token endpoint override.
    pub token_url: Option<String>,

    /// Quota endpoint override.
    pub quota_url: Option<String>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,
}

impl GoogleSettings {
    /// Resolves credentials and applies endpoint and timeout overrides.
    pub fn to_provider_config(&self) -> Result<GoogleConfig, String> {
        let credentials = self.resolve_credentials()?;
        let mut config = GoogleConfig::new(credentials);

        if let Some(ref url) = self.token_url {
            config = config.with_token_url(url);
        }
        if let Some(ref url) = self.quota_url {
            config = config.with_quota_url(url);
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    /// Resolves the OAuth client credentials, expanding secret references.
    pub fn resolve_credentials(&self) -> Result<OAuthCredentials, String> {
        let raw_id = self.client_id.as_deref().ok_or_else(|| {
            "Google credentials not found. Add to config.toml:\n  \
             [google]\n  \
             client_id = \"YOUR_ID.apps.googleusercontent.com\"\n  \
             client_secret = \"YOUR_SECRET\""
                .to_string()
        })?;

        let raw_secret = self.client_secret.as_deref().ok_or_else(|| {
            "client_secret is missing from [google] section in config.toml".to_string()
        })?;

        let client_id = crate::secret::resolve(raw_id)
            .map_err(|e| format!("failed to resolve client_id: {}", e))?;
        let client_secret = crate::secret::resolve(raw_secret)
            .map_err(|e| format!("failed to resolve client_secret: {}", e))?;

        Ok(OAuthCredentials::new(client_id, client_secret))
    }
}

/// Writes `client_id` and `client_secret` under `[google]` in the config
/// file at `path`, keeping everything else in the file as it was.
pub fn save_credentials(path: &Path, client_id: &str, client_secret: &str) -> ClientResult<()> {
    let content = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut doc = content.parse::<toml_edit::DocumentMut>().map_err(|e| {
        ClientError::Config(format!("could not parse {} for writing: {}", path.display(), e))
    })?;

    if !doc.contains_key("google") {
        doc["google"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let google = doc["google"].as_table_mut().ok_or_else(|| {
        ClientError::Config(format!("`google` in {} is not a table", path.display()))
    })?;
    google["client_id"] = toml_edit::value(client_id);
    google["client_secret"] = toml_edit::value(client_secret);

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, doc.to_string())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }

    info!(path = %path.display(), "saved Google credentials");
    Ok(())
}

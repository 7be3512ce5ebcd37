//! Google Drive provider configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// OAuth 2.0 client credentials of the application.
///
/// Google requires registered applications, so users bring their own
/// client ID and secret.
#[derive(Clone)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Layout of the credentials JSON downloaded from Google Cloud Console,
/// or the flat layout written by gcloud.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads credentials from a Google Cloud Console JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("failed to read credentials file: {}", e))?;
        Self::from_json(&content)
    }

    /// Parses credentials from either an `installed`/`web` section or
    /// root-level `client_id`/`client_secret`.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: CredentialsFile = serde_json::from_str(json)
            .map_err(|e| format!("failed to parse credentials JSON: {}", e))?;

        if let Some(creds) = file.installed.or(file.web) {
            return Ok(Self::new(creds.client_id, creds.client_secret));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err("credentials file must contain an 'installed'/'web' section or root-level 'client_id'/'client_secret'".to_string())
    }

    /// Checks that the credentials look like Google OAuth client credentials.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Everything the quota fetcher needs to talk to Google.
///
/// Passed explicitly to [`QuotaFetcher::new`](crate::QuotaFetcher::new);
/// tests point the endpoints at a local mock server.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client credentials used for token refresh.
    pub credentials: OAuthCredentials,

    /// OAuth token endpoint.
    pub token_url: String,

    /// Drive `about` endpoint returning `storageQuota`.
    pub quota_url: String,

    /// Timeout applied to every HTTP request.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

    /// Google's OAuth token endpoint.
    pub const DEFAULT_TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Drive v3 `about` resource restricted to the quota fields.
    pub const DEFAULT_QUOTA_URL: &'static str =
        "https://www.googleapis.com/drive/v3/about?fields=storageQuota";

    /// Scope needed to read the storage quota.
    pub const DRIVE_SCOPE: &'static str =
        "https://www.googleapis.com/auth/drive.metadata.readonly";

    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            token_url: Self::DEFAULT_TOKEN_URL.to_string(),
            quota_url: Self::DEFAULT_QUOTA_URL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("drivequota/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_quota_url(mut self, url: impl Into<String>) -> Self {
        self.quota_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates credentials, endpoints and timeout.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        validate_endpoint("token_url", &self.token_url)?;
        validate_endpoint("quota_url", &self.quota_url)?;

        if self.timeout.is_zero() {
            return Err("timeout must be greater than zero".to_string());
        }

        Ok(())
    }
}

fn validate_endpoint(name: &str, value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| format!("invalid {} '{}': {}", name, value, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("{} must use http or https, got '{}'", name, other)),
    }
}

//! Google endpoints: OAuth token refresh and the Drive `about` resource.
//!
//! Both clients share one `reqwest::Client` built by the
//! [`QuotaFetcher`](crate::QuotaFetcher) from a [`GoogleConfig`], so the
//! configured timeout bounds every call.

mod config;
mod drive;
mod oauth;

pub use config::{GoogleConfig, OAuthCredentials};
pub use drive::DriveClient;
pub use oauth::{OAuthClient, TokenResponse};

use crate::error::{FetchResult, QuotaError};

/// Builds the HTTP client shared by the Google clients.
pub(crate) fn http_client(config: &GoogleConfig) -> FetchResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| {
            QuotaError::configuration(format!("failed to create HTTP client: {}", e))
                .with_source(e)
        })
}

/// Maps a transport failure to a network error.
pub(crate) fn request_error(e: reqwest::Error) -> QuotaError {
    let message = if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        format!("request failed: {}", e)
    };
    QuotaError::network(message).with_source(e)
}

//! Client error types.

use drivequota_providers::QuotaError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid command-line input.
    #[error("invalid input: {0}")]
    Input(String),

    /// Fetcher, store or provider failure.
    #[error(transparent)]
    Quota(#[from] QuotaError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering or parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            ClientError::Config("no [google] section".to_string()).to_string(),
            "configuration error: no [google] section"
        );
        let quota: ClientError = QuotaError::not_found("no linked Google account 7").into();
        assert_eq!(quota.to_string(), "not_found: no linked Google account 7");
    }
}

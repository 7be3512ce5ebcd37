//! Error types for quota fetching.
//!
//! Every failure of the fetch pipeline is a [`QuotaError`] value. The
//! dashboard turns them into per-account messages, so nothing here is
//! ever allowed to escape as a panic.

use std::fmt;

use drivequota_core::LinkedAccount;
use thiserror::Error;

/// The category of a quota error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuotaErrorKind {
    /// No credential is stored for the account.
    MissingCredential,
    /// The access token was rejected and there is no refresh token.
    MissingRefreshToken,
    /// The provider rejected the credentials, even after a refresh.
    ProviderAuthFailure,
    /// The provider answered with a non-auth error status.
    ProviderError,
    /// Connection failure, timeout, DNS resolution.
    NetworkError,
    /// The provider answered with a body that could not be understood.
    MalformedResponse,
    /// Missing or invalid configuration.
    Configuration,
    /// The token store could not be read or written.
    Storage,
    /// The requested account is not linked.
    NotFound,
}

impl QuotaErrorKind {
    /// Returns the snake_case name used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::MissingRefreshToken => "missing_refresh_token",
            Self::ProviderAuthFailure => "provider_auth_failure",
            Self::ProviderError => "provider_error",
            Self::NetworkError => "network_error",
            Self::MalformedResponse => "malformed_response",
            Self::Configuration => "configuration_error",
            Self::Storage => "storage_error",
            Self::NotFound => "not_found",
        }
    }

    /// Returns true if re-linking the account is the only way out.
    pub fn needs_relink(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential | Self::MissingRefreshToken | Self::ProviderAuthFailure
        )
    }
}

impl fmt::Display for QuotaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while fetching quota for a linked account.
#[derive(Debug, Error)]
pub struct QuotaError {
    kind: QuotaErrorKind,
    message: String,
    /// Display form of the account, set at the fetcher boundary.
    account: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl QuotaError {
    /// Creates a new error with the given kind and message.
    pub fn new(kind: QuotaErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            account: None,
            source: None,
        }
    }

    pub fn missing_credential(message: impl Into<String>) -> Self {
        Self::new(QuotaErrorKind::MissingCredential, message)
    }

    pub fn missing_refresh_token(message: impl Into<String>) -> Self {
        Self::new(QuotaErrorKind::MissingRefreshToken, message)
    }

    pub fn auth_failure(message: impl Into<String>) -> Self {
        Self::new(QuotaErrorKind::ProviderAuthFailure, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(QuotaErrorKind::ProviderError, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(QuotaErrorKind::NetworkError, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(QuotaErrorKind::MalformedResponse, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(QuotaErrorKind::Configuration, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(QuotaErrorKind::Storage, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(QuotaErrorKind::NotFound, message)
    }

    /// Tags the error with the account it belongs to.
    pub fn with_account(mut self, account: &LinkedAccount) -> Self {
        self.account = Some(account.to_string());
        self
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> QuotaErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the account tag, if set.
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }
}

impl fmt::Display for QuotaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref account) = self.account {
            write!(f, "[{}] ", account)?;
        }
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// A specialized Result type for quota operations.
pub type FetchResult<T> = Result<T, QuotaError>;

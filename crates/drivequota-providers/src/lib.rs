//! Google Drive quota fetching for linked accounts.
//!
//! - [`QuotaFetcher`] - fetches one account's quota, refreshing the OAuth
//!   token at most once
//! - [`DashboardService`] - fetches all accounts of a user and aggregates
//! - [`TokenStore`] - where linked accounts and credentials live
//! - [`QuotaError`] - every failure, as a value
//!
//! # Flow
//!
//! ```text
//!   TokenStore ──credential──▶ QuotaFetcher ──GET about──▶ Drive
//!        ▲                        │   │
//!        └──── save refreshed ────┘   └──401──▶ token endpoint, retry once
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use drivequota_providers::{DashboardService, FileTokenStore, GoogleConfig, OAuthCredentials, QuotaFetcher};
//!
//! let store = Arc::new(FileTokenStore::open(FileTokenStore::default_path())?);
//! let config = GoogleConfig::new(OAuthCredentials::new(client_id, client_secret));
//! let service = DashboardService::new(QuotaFetcher::new(config, store)?);
//! let dashboard = service.build("alice").await?;
//! ```

pub mod error;
pub mod fetcher;
pub mod google;
pub mod service;
pub mod store;

pub use error::{FetchResult, QuotaError, QuotaErrorKind};
pub use fetcher::QuotaFetcher;
pub use google::{GoogleConfig, OAuthCredentials, TokenResponse};
pub use service::DashboardService;
pub use store::{Credential, FileTokenStore, MemoryTokenStore, TokenStore};

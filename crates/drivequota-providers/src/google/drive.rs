//! Drive v3 `about` client for the storage quota.

use drivequota_core::QuotaResult;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::error::{FetchResult, QuotaError};

use super::request_error;

/// `GET about?fields=storageQuota` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AboutResponse {
    storage_quota: Option<StorageQuota>,
}

/// Quota fields; Google sends them as decimal strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageQuota {
    #[serde(default, deserialize_with = "byte_count")]
    limit: Option<u64>,
    #[serde(default, deserialize_with = "byte_count")]
    usage: Option<u64>,
    #[serde(default, deserialize_with = "byte_count")]
    usage_in_drive: Option<u64>,
    #[serde(default, deserialize_with = "byte_count")]
    usage_in_drive_trash: Option<u64>,
}

impl From<StorageQuota> for QuotaResult {
    fn from(quota: StorageQuota) -> Self {
        QuotaResult::from_reported(quota.usage, quota.limit)
            .with_breakdown(quota.usage_in_drive, quota.usage_in_drive_trash)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

/// Accepts `"123"`, `123` or `null`. An empty string counts as absent.
fn byte_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<u64>()
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("invalid byte count '{}': {}", s, e)))
        }
    }
}

/// Parses an `about` body into a quota.
///
/// A body without `storageQuota` is read as empty: no usage, no limit.
pub(crate) fn parse_about(body: &str) -> FetchResult<QuotaResult> {
    let about: AboutResponse = serde_json::from_str(body).map_err(|e| {
        QuotaError::malformed(format!("failed to parse storageQuota: {}", e)).with_source(e)
    })?;
    let quota = about.storage_quota.unwrap_or_else(|| {
        warn!("response has no storageQuota, treating as empty");
        StorageQuota::default()
    });
    Ok(quota.into())
}

/// Client for the Drive `about` endpoint.
#[derive(Debug, Clone)]
pub struct DriveClient {
    quota_url: String,
    http_client: reqwest::Client,
}

impl DriveClient {
    pub fn new(quota_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            quota_url: quota_url.into(),
            http_client,
        }
    }

    /// Fetches the storage quota with the given access token.
    ///
    /// Only a 401 maps to
    /// [`ProviderAuthFailure`](crate::QuotaErrorKind::ProviderAuthFailure);
    /// the fetcher uses that to decide whether to refresh.
    pub async fn storage_quota(&self, access_token: &str) -> FetchResult<QuotaResult> {
        debug!(url = %self.quota_url, "requesting storage quota");
        let response = self
            .http_client
            .get(&self.quota_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(QuotaError::auth_failure("access token rejected"));
        }

        let body = response.text().await.map_err(|e| {
            QuotaError::network(format!("failed to read response: {}", e)).with_source(e)
        })?;

        if !status.is_success() {
            return Err(QuotaError::provider(format!(
                "Drive API error ({}): {}",
                status,
                body.trim()
            )));
        }

        parse_about(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivequota_core::ByteLimit;

    const GIB: u64 = 1 << 30;

    #[test]
    fn parses_string_fields() {
        let quota = parse_about(
            r#"{"storageQuota": {
                "limit": "16106127360",
                "usage": "4294967296",
                "usageInDrive": "3221225472",
                "usageInDriveTrash": "1073741824"
            }}"#,
        )
        .unwrap();
        assert_eq!(quota.usage_bytes, 4 * GIB);
        assert_eq!(quota.limit_bytes, ByteLimit::Finite(15 * GIB));
        assert_eq!(quota.usage_in_drive, Some(3 * GIB));
        assert_eq!(quota.usage_in_drive_trash, Some(GIB));
        assert_eq!(quota.remaining_bytes(), Some(11 * GIB as i64));
    }

    #[test]
    fn parses_integer_fields() {
        let quota =
            parse_about(r#"{"storageQuota": {"limit": 2048, "usage": 1024}}"#).unwrap();
        assert_eq!(quota.usage_bytes, 1024);
        assert_eq!(quota.limit_bytes, ByteLimit::Finite(2048));
        assert_eq!(quota.usage_in_drive, None);
    }

    #[test]
    fn missing_or_zero_limit_is_unlimited() {
        let quota = parse_about(r#"{"storageQuota": {"usage": "10"}}"#).unwrap();
        assert_eq!(quota.limit_bytes, ByteLimit::Unlimited);
        assert_eq!(quota.remaining_bytes(), None);

        let quota = parse_about(r#"{"storageQuota": {"limit": "0", "usage": "10"}}"#).unwrap();
        assert_eq!(quota.limit_bytes, ByteLimit::Unlimited);
    }

    #[test]
    fn missing_usage_is_zero() {
        let quota = parse_about(r#"{"storageQuota": {"limit": "100"}}"#).unwrap();
        assert_eq!(quota.usage_bytes, 0);
        assert_eq!(quota.remaining_bytes(), Some(100));
    }

    #[test]
    fn missing_storage_quota_is_empty() {
        let quota = parse_about("{}").unwrap();
        assert_eq!(quota.usage_bytes, 0);
        assert_eq!(quota.limit_bytes, ByteLimit::Unlimited);
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_about("<html>").unwrap_err();
        assert_eq!(err.kind(), crate::error::QuotaErrorKind::MalformedResponse);

        let err = parse_about(r#"{"storageQuota": {"usage": "lots"}}"#).unwrap_err();
        assert_eq!(err.kind(), crate::error::QuotaErrorKind::MalformedResponse);

        let err = parse_about(r#"{"storageQuota": {"usage": -5}}"#).unwrap_err();
        assert_eq!(err.kind(), crate::error::QuotaErrorKind::MalformedResponse);
    }
}

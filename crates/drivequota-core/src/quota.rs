//! Storage quota values for a single account.
//!
//! Providers report a usage/limit pair. A limit that is absent or zero means
//! the account has no storage cap, so it is normalized to
//! [`ByteLimit::Unlimited`] before any arithmetic happens.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A storage limit in bytes, or no limit at all.
///
/// Serializes as a plain number, or `null` when unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ByteLimit {
    /// A finite limit in bytes (always non-zero once normalized).
    Finite(u64),
    /// No storage cap.
    Unlimited,
}

impl ByteLimit {
    /// Normalizes a provider-reported limit: `None` and `Some(0)` are unlimited.
    pub fn from_reported(limit: Option<u64>) -> Self {
        match limit {
            Some(bytes) if bytes > 0 => Self::Finite(bytes),
            _ => Self::Unlimited,
        }
    }

    /// Returns the finite byte count, or `None` when unlimited.
    pub fn finite(&self) -> Option<u64> {
        match self {
            Self::Finite(bytes) => Some(*bytes),
            Self::Unlimited => None,
        }
    }

    /// Returns true if there is no storage cap.
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

/// Quota usage for one linked account, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaResult {
    /// Bytes used across all Google services.
    pub usage_bytes: u64,
    /// The storage limit.
    pub limit_bytes: ByteLimit,
    /// Bytes used by files in Drive, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_in_drive: Option<u64>,
    /// Bytes used by trashed Drive files, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_in_drive_trash: Option<u64>,
}

impl QuotaResult {
    /// Creates a quota result from an already-normalized limit.
    pub fn new(usage_bytes: u64, limit_bytes: ByteLimit) -> Self {
        Self {
            usage_bytes,
            limit_bytes,
            usage_in_drive: None,
            usage_in_drive_trash: None,
        }
    }

    /// Creates a quota result from raw provider values.
    ///
    /// Missing usage counts as zero; missing or zero limit is unlimited.
    pub fn from_reported(usage: Option<u64>, limit: Option<u64>) -> Self {
        Self::new(usage.unwrap_or(0), ByteLimit::from_reported(limit))
    }

    /// Builder method to set the Drive usage breakdown.
    pub fn with_breakdown(mut self, in_drive: Option<u64>, in_trash: Option<u64>) -> Self {
        self.usage_in_drive = in_drive;
        self.usage_in_drive_trash = in_trash;
        self
    }

    /// Remaining bytes (`limit - usage`), or `None` when unlimited.
    ///
    /// Negative when the account is over its quota.
    pub fn remaining_bytes(&self) -> Option<i64> {
        self.limit_bytes
            .finite()
            .map(|limit| signed(limit) - signed(self.usage_bytes))
    }

    /// Percentage of the limit in use, or `None` when unlimited.
    pub fn percent_used(&self) -> Option<u32> {
        self.limit_bytes
            .finite()
            .and_then(|limit| percent(self.usage_bytes, limit))
    }
}

/// Converts a byte count to `i64`, clamping values past `i64::MAX`.
pub(crate) fn signed(bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or(i64::MAX)
}

/// `round(used / limit * 100)` with ties rounded to even, `None` for a
/// zero limit.
pub(crate) fn percent(used: u64, limit: u64) -> Option<u32> {
    if limit == 0 {
        return None;
    }
    let (scaled, limit) = (u128::from(used) * 100, u128::from(limit));
    let (quotient, remainder) = (scaled / limit, scaled % limit);
    let pct = match (remainder * 2).cmp(&limit) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal => quotient + (quotient % 2),
    };
    Some(u32::try_from(pct).unwrap_or(u32::MAX))
}

//! Cross-account quota aggregation.

use serde::{Deserialize, Serialize};

use crate::quota::{percent, signed, ByteLimit, QuotaResult};

/// Totals over every account whose quota could be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateQuota {
    /// Sum of usage over successfully fetched accounts.
    pub total_used: u64,
    /// Sum of limits, or unlimited if any contributing account is unlimited.
    pub total_limit: ByteLimit,
    /// `total_limit - total_used`, or `None` when unlimited.
    pub total_remaining: Option<i64>,
    /// Rounded usage percentage, `None` when the limit is unlimited or zero.
    pub percent_used: Option<u32>,
    /// Number of accounts included in the totals.
    pub accounts_counted: usize,
    /// Number of accounts excluded because their fetch failed.
    pub accounts_failed: usize,
}

impl Default for AggregateQuota {
    fn default() -> Self {
        Self {
            total_used: 0,
            total_limit: ByteLimit::Finite(0),
            total_remaining: Some(0),
            percent_used: None,
            accounts_counted: 0,
            accounts_failed: 0,
        }
    }
}

/// Aggregates per-account quota results into one total.
///
/// Failed entries are skipped and only counted in `accounts_failed`. The
/// total limit stays finite only while every counted account is finite.
pub fn aggregate<'a, I, E>(results: I) -> AggregateQuota
where
    I: IntoIterator<Item = &'a Result<QuotaResult, E>>,
    E: 'a,
{
    let mut total = AggregateQuota::default();
    let mut limit_sum: Option<u64> = Some(0);

    for result in results {
        let Ok(quota) = result else {
            total.accounts_failed += 1;
            continue;
        };

        total.accounts_counted += 1;
        total.total_used = total.total_used.saturating_add(quota.usage_bytes);
        limit_sum = match (limit_sum, quota.limit_bytes) {
            (Some(sum), ByteLimit::Finite(limit)) => Some(sum.saturating_add(limit)),
            _ => None,
        };
    }

    match limit_sum {
        Some(limit) => {
            total.total_limit = ByteLimit::Finite(limit);
            total.total_remaining = Some(signed(limit) - signed(total.total_used));
            total.percent_used = percent(total.total_used, limit);
        }
        None => {
            total.total_limit = ByteLimit::Unlimited;
            total.total_remaining = None;
            total.percent_used = None;
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: u64 = 1 << 30;

    fn ok(usage: u64, limit: Option<u64>) -> Result<QuotaResult, String> {
        Ok(QuotaResult::from_reported(Some(usage), limit))
    }

    fn failed(message: &str) -> Result<QuotaResult, String> {
        Err(message.to_string())
    }

    #[test]
    fn two_finite_accounts() {
        let results = [ok(4 * GIB, Some(15 * GIB)), ok(GIB, Some(15 * GIB))];
        let total = aggregate(&results);

        assert_eq!(total.total_used, 5 * GIB);
        assert_eq!(total.total_limit, ByteLimit::Finite(30 * GIB));
        assert_eq!(total.total_remaining, Some((25 * GIB) as i64));
        assert_eq!(total.percent_used, Some(17));
        assert_eq!(total.accounts_counted, 2);
        assert_eq!(total.accounts_failed, 0);
    }

    #[test]
    fn any_unlimited_account_makes_total_unlimited() {
        let results = [ok(3 * GIB, None), ok(GIB, Some(15 * GIB))];
        let total = aggregate(&results);

        assert_eq!(total.total_used, 4 * GIB);
        assert_eq!(total.total_limit, ByteLimit::Unlimited);
        assert_eq!(total.total_remaining, None);
        assert_eq!(total.percent_used, None);

        // Order does not matter.
        let results = [ok(GIB, Some(15 * GIB)), ok(3 * GIB, Some(0))];
        assert_eq!(aggregate(&results).total_limit, ByteLimit::Unlimited);
    }

    #[test]
    fn failed_accounts_are_excluded() {
        let results = [
            ok(4 * GIB, Some(15 * GIB)),
            failed("network_error: connection refused"),
            ok(GIB, Some(15 * GIB)),
        ];
        let total = aggregate(&results);

        assert_eq!(total.total_used, 5 * GIB);
        assert_eq!(total.total_limit, ByteLimit::Finite(30 * GIB));
        assert_eq!(total.percent_used, Some(17));
        assert_eq!(total.accounts_counted, 2);
        assert_eq!(total.accounts_failed, 1);
    }

    #[test]
    fn failed_unlimited_account_does_not_poison_total() {
        // A failed fetch tells us nothing about the limit.
        let results = [failed("boom"), ok(GIB, Some(2 * GIB))];
        let total = aggregate(&results);
        assert_eq!(total.total_limit, ByteLimit::Finite(2 * GIB));
        assert_eq!(total.percent_used, Some(50));
    }

    #[test]
    fn nothing_fetched_gives_zero_limit() {
        let total = aggregate(&[failed("a"), failed("b")]);
        assert_eq!(total.total_used, 0);
        assert_eq!(total.total_limit, ByteLimit::Finite(0));
        assert_eq!(total.percent_used, None);
        assert_eq!(total.accounts_failed, 2);

        let empty: [Result<QuotaResult, String>; 0] = [];
        assert_eq!(aggregate(&empty), AggregateQuota::default());
    }

    #[test]
    fn aggregation_is_deterministic() {
        let results = [ok(10, Some(100)), failed("x"), ok(20, Some(50))];
        assert_eq!(aggregate(&results), aggregate(&results));
        assert_eq!(aggregate(&results).percent_used, Some(20));
    }
}
